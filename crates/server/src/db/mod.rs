//! Database operations for the academy `PostgreSQL` database.
//!
//! ## Tables (schema `academy`)
//!
//! - `user` - Staff accounts (admins and editors)
//! - `post` - Blog and news posts
//! - `service` - Service catalog
//! - `program` - Training programs
//! - `team_member` - Team page profiles
//! - `portfolio` - Portfolio case studies
//! - `page_view` - Append-only first-party analytics
//! - `translation` - Locale dictionaries
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p academy-cli -- migrate
//! ```

pub mod page_views;
pub mod portfolio;
pub mod posts;
pub mod programs;
pub mod services;
pub mod team;
pub mod translations;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use page_views::PageViewRepository;
pub use portfolio::PortfolioRepository;
pub use posts::PostRepository;
pub use programs::ProgramRepository;
pub use services::ServiceRepository;
pub use team::TeamRepository;
pub use translations::TranslationRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, everything else to `Database`.
    pub(crate) fn from_unique(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Catalog tables whose rows carry a `display_order` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderedTable {
    Service,
    Program,
    TeamMember,
    Portfolio,
}

impl OrderedTable {
    const fn table_name(self) -> &'static str {
        match self {
            Self::Service => "academy.service",
            Self::Program => "academy.program",
            Self::TeamMember => "academy.team_member",
            Self::Portfolio => "academy.portfolio",
        }
    }
}

/// Rewrite `display_order` for a set of rows in one transaction.
///
/// Returns the number of rows updated. Unknown IDs are ignored, so the count
/// can be lower than `items.len()`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any update fails; no row is changed
/// in that case.
pub async fn reorder(
    pool: &PgPool,
    table: OrderedTable,
    items: &[(i32, i32)],
) -> Result<u64, RepositoryError> {
    let sql = format!(
        "UPDATE {} SET display_order = $2 WHERE id = $1",
        table.table_name()
    );

    let mut tx = pool.begin().await?;
    let mut updated = 0;
    for (id, order) in items {
        updated += sqlx::query(&sql)
            .bind(id)
            .bind(order)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }
    tx.commit().await?;

    Ok(updated)
}
