//! Page view repository for the first-party tracker.
//!
//! Aggregation happens in [`crate::services::analytics`]; this module only
//! appends rows and reads windows of them back.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use academy_core::PageViewId;

use super::RepositoryError;
use crate::models::{NewPageView, PageView, Utm};

const PAGE_VIEW_COLUMNS: &str = "id, session_id, path, referrer, utm_source, utm_medium,
    utm_campaign, utm_term, utm_content, user_agent, duration_seconds, created_at";

/// Internal row type for page view queries.
#[derive(Debug, sqlx::FromRow)]
struct PageViewRow {
    id: i64,
    session_id: String,
    path: String,
    referrer: Option<String>,
    utm_source: Option<String>,
    utm_medium: Option<String>,
    utm_campaign: Option<String>,
    utm_term: Option<String>,
    utm_content: Option<String>,
    user_agent: Option<String>,
    duration_seconds: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<PageViewRow> for PageView {
    fn from(row: PageViewRow) -> Self {
        Self {
            id: PageViewId::new(row.id),
            session_id: row.session_id,
            path: row.path,
            referrer: row.referrer,
            utm: Utm {
                source: row.utm_source,
                medium: row.utm_medium,
                campaign: row.utm_campaign,
                term: row.utm_term,
                content: row.utm_content,
            },
            user_agent: row.user_agent,
            duration_seconds: row.duration_seconds,
            created_at: row.created_at,
        }
    }
}

/// Repository for page view database operations.
pub struct PageViewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PageViewRepository<'a> {
    /// Create a new page view repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a page view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, view: &NewPageView) -> Result<PageViewId, RepositoryError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO academy.page_view
                (session_id, path, referrer, utm_source, utm_medium, utm_campaign,
                 utm_term, utm_content, user_agent, duration_seconds)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING id",
        )
        .bind(&view.session_id)
        .bind(&view.path)
        .bind(&view.referrer)
        .bind(&view.utm.source)
        .bind(&view.utm.medium)
        .bind(&view.utm.campaign)
        .bind(&view.utm.term)
        .bind(&view.utm.content)
        .bind(&view.user_agent)
        .bind(view.duration_seconds)
        .fetch_one(self.pool)
        .await?;

        Ok(PageViewId::new(id))
    }

    /// Attach time-on-page to a view.
    ///
    /// The session must match the one that recorded the view, and a view
    /// that already carries a duration is left alone so a replayed beacon
    /// cannot overwrite it. Returns whether a row changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_duration(
        &self,
        id: PageViewId,
        session_id: &str,
        seconds: i32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE academy.page_view SET duration_seconds = $3
             WHERE id = $1 AND session_id = $2 AND duration_seconds IS NULL",
        )
        .bind(id)
        .bind(session_id)
        .bind(seconds)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All views with `start <= created_at < end`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PageView>, RepositoryError> {
        let rows = sqlx::query_as::<_, PageViewRow>(&format!(
            "SELECT {PAGE_VIEW_COLUMNS} FROM academy.page_view
             WHERE created_at >= $1 AND created_at < $2
             ORDER BY created_at, id"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Number of distinct sessions with a view at or after `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_sessions_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT session_id) FROM academy.page_view WHERE created_at >= $1",
        )
        .bind(cutoff)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// The page each active session is currently on, counted per path.
    ///
    /// A session's current page is its most recent view at or after `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_pages_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<(String, i64)>, RepositoryError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT path, COUNT(*) AS sessions FROM (
                 SELECT DISTINCT ON (session_id) session_id, path
                 FROM academy.page_view
                 WHERE created_at >= $1
                 ORDER BY session_id, created_at DESC
             ) current
             GROUP BY path
             ORDER BY sessions DESC, path",
        )
        .bind(cutoff)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
