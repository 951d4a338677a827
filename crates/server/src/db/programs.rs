//! Program repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use academy_core::{ProgramId, ProgramLevel, Slug};

use super::RepositoryError;
use crate::models::{FlagChanges, Program, ProgramInput};

const PROGRAM_COLUMNS: &str = "id, title, slug, description, icon, image_url, duration, level, price,
    features, display_order, is_active, is_featured, created_at, updated_at";

/// Internal row type for program queries.
#[derive(Debug, sqlx::FromRow)]
struct ProgramRow {
    id: i32,
    title: String,
    slug: String,
    description: String,
    icon: Option<String>,
    image_url: Option<String>,
    duration: Option<String>,
    level: ProgramLevel,
    price: Option<Decimal>,
    features: Vec<String>,
    display_order: i32,
    is_active: bool,
    is_featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProgramRow> for Program {
    type Error = RepositoryError;

    fn try_from(row: ProgramRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid program slug: {e}")))?;

        Ok(Self {
            id: ProgramId::new(row.id),
            title: row.title,
            slug,
            description: row.description,
            icon: row.icon,
            image_url: row.image_url,
            duration: row.duration,
            level: row.level,
            price: row.price,
            features: row.features,
            display_order: row.display_order,
            is_active: row.is_active,
            is_featured: row.is_featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for program database operations.
pub struct ProgramRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProgramRepository<'a> {
    /// Create a new program repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List programs in display order, optionally only featured ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        include_inactive: bool,
        featured_only: bool,
    ) -> Result<Vec<Program>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProgramRow>(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM academy.program
             WHERE ($1 OR is_active) AND (NOT $2 OR is_featured)
             ORDER BY display_order, id"
        ))
        .bind(include_inactive)
        .bind(featured_only)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a program by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProgramId) -> Result<Option<Program>, RepositoryError> {
        let row = sqlx::query_as::<_, ProgramRow>(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM academy.program WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a program by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Program>, RepositoryError> {
        let row = sqlx::query_as::<_, ProgramRow>(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM academy.program WHERE slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a program.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(
        &self,
        input: &ProgramInput,
        slug: &Slug,
    ) -> Result<Program, RepositoryError> {
        let row = sqlx::query_as::<_, ProgramRow>(&format!(
            "INSERT INTO academy.program
                (title, slug, description, icon, image_url, duration, level, price,
                 features, display_order, is_active, is_featured)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {PROGRAM_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(slug.as_str())
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&input.image_url)
        .bind(&input.duration)
        .bind(input.level)
        .bind(input.price)
        .bind(&input.features)
        .bind(input.display_order)
        .bind(input.is_active)
        .bind(input.is_featured)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug already exists"))?;

        row.try_into()
    }

    /// Replace the editable fields of a program. Flags left `None` in
    /// `flags` keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the program does not exist, or
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: ProgramId,
        input: &ProgramInput,
        slug: &Slug,
        flags: FlagChanges,
    ) -> Result<Program, RepositoryError> {
        let row = sqlx::query_as::<_, ProgramRow>(&format!(
            "UPDATE academy.program SET
                title = $2, slug = $3, description = $4, icon = $5, image_url = $6,
                duration = $7, level = $8, price = $9, features = $10,
                display_order = $11, is_active = COALESCE($12, is_active),
                is_featured = COALESCE($13, is_featured)
             WHERE id = $1
             RETURNING {PROGRAM_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(slug.as_str())
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&input.image_url)
        .bind(&input.duration)
        .bind(input.level)
        .bind(input.price)
        .bind(&input.features)
        .bind(input.display_order)
        .bind(flags.is_active)
        .bind(flags.is_featured)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug already exists"))?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Flip the `is_active` flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the program does not exist.
    pub async fn toggle_active(&self, id: ProgramId) -> Result<Program, RepositoryError> {
        self.flip(id, "is_active").await
    }

    /// Flip the `is_featured` flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the program does not exist.
    pub async fn toggle_featured(&self, id: ProgramId) -> Result<Program, RepositoryError> {
        self.flip(id, "is_featured").await
    }

    async fn flip(&self, id: ProgramId, column: &'static str) -> Result<Program, RepositoryError> {
        let row = sqlx::query_as::<_, ProgramRow>(&format!(
            "UPDATE academy.program SET {column} = NOT {column} WHERE id = $1
             RETURNING {PROGRAM_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete a program.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the program does not exist.
    pub async fn delete(&self, id: ProgramId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM academy.program WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
