use {sqlx::SqlitePool, tracing::debug};

use kinogram_i18n::Locale;

use crate::error::{Error, Result};

/// A persisted per-user record tracking display-language preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub language: Locale,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub updated_at: i64,
}

/// SQLite-backed profile store.
#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch the profile for `user_id`, creating it with
    /// `fallback_language` if absent.
    ///
    /// Insert-if-absent is a single statement, so concurrent first contacts
    /// from the same user converge on one record. An existing profile is
    /// returned unchanged; the fallback only matters at creation time.
    pub async fn find_or_create(
        &self,
        user_id: i64,
        fallback_language: Locale,
    ) -> Result<UserProfile> {
        let now = unix_now();
        let row: Option<(i64, String, i64, i64)> = sqlx::query_as(
            "INSERT INTO users (id, language, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(id) DO UPDATE SET id = excluded.id
             RETURNING id, language, created_at, updated_at",
        )
        .bind(user_id)
        .bind(fallback_language.code())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|source| Error::profile_unavailable(user_id, source))?;

        let Some(row) = row else {
            return Err(Error::profile_missing(user_id));
        };
        Ok(profile_from_row(row))
    }

    /// Persist a new display language for an existing profile.
    ///
    /// A missing profile is not an error; there is simply nothing to
    /// update.
    pub async fn set_language(&self, user_id: i64, language: Locale) -> Result<()> {
        let result = sqlx::query("UPDATE users SET language = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(user_id)
            .bind(language.code())
            .bind(unix_now())
            .execute(&self.pool)
            .await?;
        debug!(
            user_id,
            %language,
            updated = result.rows_affected(),
            "language preference saved"
        );
        Ok(())
    }
}

fn profile_from_row(row: (i64, String, i64, i64)) -> UserProfile {
    UserProfile {
        id: row.0,
        // An unknown stored code reads as the default rather than failing
        // the event.
        language: Locale::from_code(&row.1).unwrap_or_default(),
        created_at: row.2,
        updated_at: row.3,
    }
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}
