//! Team member repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use academy_core::TeamMemberId;

use super::RepositoryError;
use crate::models::{TeamMember, TeamMemberInput};

const TEAM_COLUMNS: &str = "id, name, position, bio, photo_url, email, linkedin_url, twitter_url,
    github_url, display_order, is_active, created_at, updated_at";

/// Internal row type for team member queries.
#[derive(Debug, sqlx::FromRow)]
struct TeamMemberRow {
    id: i32,
    name: String,
    position: String,
    bio: Option<String>,
    photo_url: Option<String>,
    email: Option<String>,
    linkedin_url: Option<String>,
    twitter_url: Option<String>,
    github_url: Option<String>,
    display_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TeamMemberRow> for TeamMember {
    fn from(row: TeamMemberRow) -> Self {
        Self {
            id: TeamMemberId::new(row.id),
            name: row.name,
            position: row.position,
            bio: row.bio,
            photo_url: row.photo_url,
            email: row.email,
            linkedin_url: row.linkedin_url,
            twitter_url: row.twitter_url,
            github_url: row.github_url,
            display_order: row.display_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for team member database operations.
pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    /// Create a new team repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List team members in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<TeamMember>, RepositoryError> {
        let rows = sqlx::query_as::<_, TeamMemberRow>(&format!(
            "SELECT {TEAM_COLUMNS} FROM academy.team_member
             WHERE $1 OR is_active
             ORDER BY display_order, id"
        ))
        .bind(include_inactive)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a team member by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: TeamMemberId,
    ) -> Result<Option<TeamMember>, RepositoryError> {
        let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
            "SELECT {TEAM_COLUMNS} FROM academy.team_member WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a team member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &TeamMemberInput) -> Result<TeamMember, RepositoryError> {
        let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
            "INSERT INTO academy.team_member
                (name, position, bio, photo_url, email, linkedin_url, twitter_url,
                 github_url, display_order, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {TEAM_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.position)
        .bind(&input.bio)
        .bind(&input.photo_url)
        .bind(&input.email)
        .bind(&input.linkedin_url)
        .bind(&input.twitter_url)
        .bind(&input.github_url)
        .bind(input.display_order)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace the editable fields of a team member. `is_active` is written
    /// only when given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the member does not exist.
    pub async fn update(
        &self,
        id: TeamMemberId,
        input: &TeamMemberInput,
        is_active: Option<bool>,
    ) -> Result<TeamMember, RepositoryError> {
        let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
            "UPDATE academy.team_member SET
                name = $2, position = $3, bio = $4, photo_url = $5, email = $6,
                linkedin_url = $7, twitter_url = $8, github_url = $9,
                display_order = $10, is_active = COALESCE($11, is_active)
             WHERE id = $1
             RETURNING {TEAM_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.position)
        .bind(&input.bio)
        .bind(&input.photo_url)
        .bind(&input.email)
        .bind(&input.linkedin_url)
        .bind(&input.twitter_url)
        .bind(&input.github_url)
        .bind(input.display_order)
        .bind(is_active)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Flip the `is_active` flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the member does not exist.
    pub async fn toggle_active(&self, id: TeamMemberId) -> Result<TeamMember, RepositoryError> {
        let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
            "UPDATE academy.team_member SET is_active = NOT is_active WHERE id = $1
             RETURNING {TEAM_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete a team member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the member does not exist.
    pub async fn delete(&self, id: TeamMemberId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM academy.team_member WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
