//! Portfolio case studies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use academy_core::{PortfolioId, Slug};

use super::{
    FlagChanges, MAX_TITLE_LENGTH, ValidationError, clean_list, clean_optional, merge_nullable,
    require_text,
};

/// A portfolio entry (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub id: PortfolioId,
    pub title: String,
    pub slug: Slug,
    pub description: String,
    pub client: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub technologies: Vec<String>,
    pub display_order: i32,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every editable field of a portfolio entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioInput {
    pub title: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl PortfolioInput {
    /// Validate and normalize, deriving the slug from the title when absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank or oversized title.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        require_text("title", &self.title, MAX_TITLE_LENGTH)?;
        self.title = self.title.trim().to_owned();
        self.description = self.description.trim().to_owned();
        self.client = clean_optional(self.client);
        self.category = clean_optional(self.category);
        self.image_url = clean_optional(self.image_url);
        self.project_url = clean_optional(self.project_url);
        self.technologies = clean_list(self.technologies);
        if self.slug.is_none() {
            self.slug = Some(
                Slug::from_title(&self.title)
                    .map_err(|e| ValidationError::new("slug", e.to_string()))?,
            );
        }
        Ok(self)
    }

    /// The slug, which is always present after [`Self::normalized`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if called on un-normalized input without a slug.
    pub fn slug(&self) -> Result<&Slug, ValidationError> {
        self.slug
            .as_ref()
            .ok_or_else(|| ValidationError::new("slug", "is required"))
    }
}

/// Partial update for a portfolio entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioPatch {
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub description: Option<String>,
    pub client: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub display_order: Option<i32>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
}

impl PortfolioPatch {
    /// Visibility flags this patch sets explicitly.
    #[must_use]
    pub const fn flags(&self) -> FlagChanges {
        FlagChanges {
            is_active: self.is_active,
            is_featured: self.is_featured,
        }
    }

    /// Apply this patch on top of the current entry.
    #[must_use]
    pub fn apply(self, current: &Portfolio) -> PortfolioInput {
        PortfolioInput {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            slug: Some(self.slug.unwrap_or_else(|| current.slug.clone())),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            client: merge_nullable(self.client, current.client.as_ref()),
            category: merge_nullable(self.category, current.category.as_ref()),
            image_url: merge_nullable(self.image_url, current.image_url.as_ref()),
            project_url: merge_nullable(self.project_url, current.project_url.as_ref()),
            technologies: self
                .technologies
                .unwrap_or_else(|| current.technologies.clone()),
            display_order: self.display_order.unwrap_or(current.display_order),
            is_featured: self.is_featured.unwrap_or(current.is_featured),
            is_active: self.is_active.unwrap_or(current.is_active),
        }
    }
}
