//! Training programs (courses, bootcamps, workshops).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use academy_core::{ProgramId, ProgramLevel, Slug};

use super::{
    FlagChanges, MAX_TITLE_LENGTH, ValidationError, clean_list, clean_optional, merge_nullable,
    require_text,
};

/// A program (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub id: ProgramId,
    pub title: String,
    pub slug: Slug,
    pub description: String,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    /// Free-form duration label, e.g. "12 weeks".
    pub duration: Option<String>,
    pub level: ProgramLevel,
    pub price: Option<Decimal>,
    pub features: Vec<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every editable field of a program.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramInput {
    pub title: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub level: ProgramLevel,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
}

const fn default_true() -> bool {
    true
}

impl ProgramInput {
    /// Validate and normalize, deriving the slug from the title when absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank title or a negative price.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        require_text("title", &self.title, MAX_TITLE_LENGTH)?;
        if self.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(ValidationError::new("price", "cannot be negative"));
        }
        self.title = self.title.trim().to_owned();
        self.description = self.description.trim().to_owned();
        self.icon = clean_optional(self.icon);
        self.image_url = clean_optional(self.image_url);
        self.duration = clean_optional(self.duration);
        self.features = clean_list(self.features);
        self.price = self.price.map(|p| p.round_dp(2));
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

/// Partial update for a program.
///
/// `clear_price` removes the price (the JSON `price` field cannot express
/// "set to null" separately from "absent").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramPatch {
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    pub duration: Option<String>,
    pub level: Option<ProgramLevel>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub clear_price: bool,
    pub features: Option<Vec<String>>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl ProgramPatch {
    /// Visibility flags this patch sets explicitly.
    #[must_use]
    pub const fn flags(&self) -> FlagChanges {
        FlagChanges {
            is_active: self.is_active,
            is_featured: self.is_featured,
        }
    }

    /// Apply this patch on top of the current program.
    #[must_use]
    pub fn apply(self, current: &Program) -> ProgramInput {
        let price = if self.clear_price {
            None
        } else {
            self.price.or(current.price)
        };

        ProgramInput {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            slug: Some(self.slug.unwrap_or_else(|| current.slug.clone())),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            icon: merge_nullable(self.icon, current.icon.as_ref()),
            image_url: merge_nullable(self.image_url, current.image_url.as_ref()),
            duration: merge_nullable(self.duration, current.duration.as_ref()),
            level: self.level.unwrap_or(current.level),
            price,
            features: self.features.unwrap_or_else(|| current.features.clone()),
            display_order: self.display_order.unwrap_or(current.display_order),
            is_active: self.is_active.unwrap_or(current.is_active),
            is_featured: self.is_featured.unwrap_or(current.is_featured),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_parses_from_string_and_rounds() {
        let input: ProgramInput =
            serde_json::from_str(r#"{"title": "ML Bootcamp", "price": "499.999"}"#).unwrap();
        let input = input.normalized().unwrap();
        assert_eq!(input.price.unwrap().to_string(), "500.00");
        assert_eq!(input.level, ProgramLevel::Beginner);
    }

    #[test]
    fn test_negative_price_rejected() {
        let input: ProgramInput =
            serde_json::from_str(r#"{"title": "ML Bootcamp", "price": "-1"}"#).unwrap();
        assert_eq!(input.normalized().unwrap_err().field, "price");
    }

    #[test]
    fn test_patch_flags_only_report_explicit_values() {
        let patch: ProgramPatch = serde_json::from_str(r#"{"title": "Renamed"}"#).unwrap();
        assert_eq!(patch.flags(), FlagChanges::default());

        let patch: ProgramPatch = serde_json::from_str(r#"{"is_featured": true}"#).unwrap();
        assert_eq!(
            patch.flags(),
            FlagChanges {
                is_active: None,
                is_featured: Some(true),
            }
        );
    }
}
