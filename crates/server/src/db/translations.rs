//! Translation dictionary repository.

use std::collections::BTreeMap;

use sqlx::PgPool;

use super::RepositoryError;

/// Repository for translation database operations.
pub struct TranslationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TranslationRepository<'a> {
    /// Create a new translation repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every key/value stored for a locale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_locale(
        &self,
        locale: &str,
    ) -> Result<BTreeMap<String, String>, RepositoryError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM academy.translation WHERE locale = $1")
                .bind(locale)
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }

    /// Insert or overwrite a batch of entries for one locale atomically.
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any write fails; nothing is
    /// stored in that case.
    pub async fn upsert(
        &self,
        locale: &str,
        entries: &BTreeMap<String, String>,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;
        for (key, value) in entries {
            written += sqlx::query(
                "INSERT INTO academy.translation (locale, key, value)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (locale, key)
                 DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
            )
            .bind(locale)
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        tx.commit().await?;

        Ok(written)
    }

    /// Remove one entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist.
    pub async fn delete(&self, locale: &str, key: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM academy.translation WHERE locale = $1 AND key = $2")
            .bind(locale)
            .bind(key)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Locales that have at least one stored entry, with their entry counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn locales(&self) -> Result<Vec<(String, i64)>, RepositoryError> {
        let rows = sqlx::query_as(
            "SELECT locale, COUNT(*) FROM academy.translation GROUP BY locale ORDER BY locale",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
