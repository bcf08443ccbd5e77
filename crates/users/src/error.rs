use thiserror::Error;

/// Crate-wide result type for profile operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The store could not produce a profile for the identity, either
    /// because the database rejected the upsert or because it yielded no
    /// row. Fatal for the event being processed; other conversations are
    /// unaffected.
    #[error("profile unavailable for user {user_id}")]
    ProfileUnavailable {
        user_id: i64,
        #[source]
        source: Option<sqlx::Error>,
    },

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl Error {
    #[must_use]
    pub fn profile_unavailable(user_id: i64, source: sqlx::Error) -> Self {
        Self::ProfileUnavailable {
            user_id,
            source: Some(source),
        }
    }

    #[must_use]
    pub fn profile_missing(user_id: i64) -> Self {
        Self::ProfileUnavailable {
            user_id,
            source: None,
        }
    }
}
