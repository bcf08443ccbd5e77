//! Persisted per-user profiles tracking display-language preference.

pub mod error;
pub mod store;

pub use {
    error::{Error, Result},
    store::{UserProfile, UserStore},
};

/// Run database migrations for the users crate.
///
/// Creates the `users` table. Call at application startup before
/// constructing a [`store::UserStore`].
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
