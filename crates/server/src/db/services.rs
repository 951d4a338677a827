//! Service catalog repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use academy_core::{ServiceId, Slug};

use super::RepositoryError;
use crate::models::{Service, ServiceInput};

const SERVICE_COLUMNS: &str =
    "id, title, slug, description, icon, features, display_order, is_active, created_at, updated_at";

/// Internal row type for service queries.
#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: i32,
    title: String,
    slug: String,
    description: String,
    icon: Option<String>,
    features: Vec<String>,
    display_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ServiceRow> for Service {
    type Error = RepositoryError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid service slug: {e}")))?;

        Ok(Self {
            id: ServiceId::new(row.id),
            title: row.title,
            slug,
            description: row.description,
            icon: row.icon,
            features: row.features,
            display_order: row.display_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for service database operations.
pub struct ServiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ServiceRepository<'a> {
    /// Create a new service repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List services in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM academy.service
             WHERE $1 OR is_active
             ORDER BY display_order, id"
        ))
        .bind(include_inactive)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a service by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ServiceId) -> Result<Option<Service>, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM academy.service WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a service by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Service>, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM academy.service WHERE slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(
        &self,
        input: &ServiceInput,
        slug: &Slug,
    ) -> Result<Service, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "INSERT INTO academy.service
                (title, slug, description, icon, features, display_order, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(slug.as_str())
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&input.features)
        .bind(input.display_order)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug already exists"))?;

        row.try_into()
    }

    /// Replace the editable fields of a service. `is_active` is written only
    /// when given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the service does not exist, or
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: ServiceId,
        input: &ServiceInput,
        slug: &Slug,
        is_active: Option<bool>,
    ) -> Result<Service, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "UPDATE academy.service SET
                title = $2, slug = $3, description = $4, icon = $5, features = $6,
                display_order = $7, is_active = COALESCE($8, is_active)
             WHERE id = $1
             RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(slug.as_str())
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&input.features)
        .bind(input.display_order)
        .bind(is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug already exists"))?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Flip the `is_active` flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the service does not exist.
    pub async fn toggle_active(&self, id: ServiceId) -> Result<Service, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "UPDATE academy.service SET is_active = NOT is_active WHERE id = $1
             RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete a service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the service does not exist.
    pub async fn delete(&self, id: ServiceId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM academy.service WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
