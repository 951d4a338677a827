//! Portfolio repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use academy_core::{PortfolioId, Slug};

use super::RepositoryError;
use crate::models::{FlagChanges, Portfolio, PortfolioInput};

const PORTFOLIO_COLUMNS: &str = "id, title, slug, description, client, category, image_url,
    project_url, technologies, display_order, is_featured, is_active, created_at, updated_at";

/// Internal row type for portfolio queries.
#[derive(Debug, sqlx::FromRow)]
struct PortfolioRow {
    id: i32,
    title: String,
    slug: String,
    description: String,
    client: Option<String>,
    category: Option<String>,
    image_url: Option<String>,
    project_url: Option<String>,
    technologies: Vec<String>,
    display_order: i32,
    is_featured: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PortfolioRow> for Portfolio {
    type Error = RepositoryError;

    fn try_from(row: PortfolioRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid portfolio slug: {e}"))
        })?;

        Ok(Self {
            id: PortfolioId::new(row.id),
            title: row.title,
            slug,
            description: row.description,
            client: row.client,
            category: row.category,
            image_url: row.image_url,
            project_url: row.project_url,
            technologies: row.technologies,
            display_order: row.display_order,
            is_featured: row.is_featured,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for portfolio database operations.
pub struct PortfolioRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PortfolioRepository<'a> {
    /// Create a new portfolio repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List entries in display order, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        include_inactive: bool,
        featured_only: bool,
        category: Option<&str>,
    ) -> Result<Vec<Portfolio>, RepositoryError> {
        let rows = sqlx::query_as::<_, PortfolioRow>(&format!(
            "SELECT {PORTFOLIO_COLUMNS} FROM academy.portfolio
             WHERE ($1 OR is_active)
               AND (NOT $2 OR is_featured)
               AND ($3::text IS NULL OR lower(category) = lower($3))
             ORDER BY display_order, id"
        ))
        .bind(include_inactive)
        .bind(featured_only)
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an entry by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: PortfolioId) -> Result<Option<Portfolio>, RepositoryError> {
        let row = sqlx::query_as::<_, PortfolioRow>(&format!(
            "SELECT {PORTFOLIO_COLUMNS} FROM academy.portfolio WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an entry by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Portfolio>, RepositoryError> {
        let row = sqlx::query_as::<_, PortfolioRow>(&format!(
            "SELECT {PORTFOLIO_COLUMNS} FROM academy.portfolio WHERE slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(
        &self,
        input: &PortfolioInput,
        slug: &Slug,
    ) -> Result<Portfolio, RepositoryError> {
        let row = sqlx::query_as::<_, PortfolioRow>(&format!(
            "INSERT INTO academy.portfolio
                (title, slug, description, client, category, image_url, project_url,
                 technologies, display_order, is_featured, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {PORTFOLIO_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(slug.as_str())
        .bind(&input.description)
        .bind(&input.client)
        .bind(&input.category)
        .bind(&input.image_url)
        .bind(&input.project_url)
        .bind(&input.technologies)
        .bind(input.display_order)
        .bind(input.is_featured)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug already exists"))?;

        row.try_into()
    }

    /// Replace the editable fields of an entry. Flags left `None` in
    /// `flags` keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist, or
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: PortfolioId,
        input: &PortfolioInput,
        slug: &Slug,
        flags: FlagChanges,
    ) -> Result<Portfolio, RepositoryError> {
        let row = sqlx::query_as::<_, PortfolioRow>(&format!(
            "UPDATE academy.portfolio SET
                title = $2, slug = $3, description = $4, client = $5, category = $6,
                image_url = $7, project_url = $8, technologies = $9,
                display_order = $10, is_featured = COALESCE($11, is_featured),
                is_active = COALESCE($12, is_active)
             WHERE id = $1
             RETURNING {PORTFOLIO_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(slug.as_str())
        .bind(&input.description)
        .bind(&input.client)
        .bind(&input.category)
        .bind(&input.image_url)
        .bind(&input.project_url)
        .bind(&input.technologies)
        .bind(input.display_order)
        .bind(flags.is_featured)
        .bind(flags.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug already exists"))?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Flip the `is_active` flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist.
    pub async fn toggle_active(&self, id: PortfolioId) -> Result<Portfolio, RepositoryError> {
        self.flip(id, "is_active").await
    }

    /// Flip the `is_featured` flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist.
    pub async fn toggle_featured(&self, id: PortfolioId) -> Result<Portfolio, RepositoryError> {
        self.flip(id, "is_featured").await
    }

    async fn flip(
        &self,
        id: PortfolioId,
        column: &'static str,
    ) -> Result<Portfolio, RepositoryError> {
        let row = sqlx::query_as::<_, PortfolioRow>(&format!(
            "UPDATE academy.portfolio SET {column} = NOT {column} WHERE id = $1
             RETURNING {PORTFOLIO_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist.
    pub async fn delete(&self, id: PortfolioId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM academy.portfolio WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
