//! Service catalog entries ("what we do" cards on the public site).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use academy_core::{ServiceId, Slug};

use super::{
    MAX_TITLE_LENGTH, ValidationError, clean_list, clean_optional, merge_nullable, require_text,
};

/// A service (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: ServiceId,
    pub title: String,
    pub slug: Slug,
    pub description: String,
    pub icon: Option<String>,
    pub features: Vec<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every editable field of a service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInput {
    pub title: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl ServiceInput {
    /// Validate and normalize, deriving the slug from the title when absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank or oversized title.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        require_text("title", &self.title, MAX_TITLE_LENGTH)?;
        self.title = self.title.trim().to_owned();
        self.description = self.description.trim().to_owned();
        self.icon = clean_optional(self.icon);
        self.features = clean_list(self.features);
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

/// Partial update for a service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicePatch {
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub features: Option<Vec<String>>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl ServicePatch {
    /// Apply this patch on top of the current service.
    #[must_use]
    pub fn apply(self, current: &Service) -> ServiceInput {
        ServiceInput {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            slug: Some(self.slug.unwrap_or_else(|| current.slug.clone())),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            icon: merge_nullable(self.icon, current.icon.as_ref()),
            features: self.features.unwrap_or_else(|| current.features.clone()),
            display_order: self.display_order.unwrap_or(current.display_order),
            is_active: self.is_active.unwrap_or(current.is_active),
        }
    }
}
