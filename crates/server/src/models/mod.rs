//! Domain models.
//!
//! Each content entity has three shapes:
//! - the entity itself (what the API returns),
//! - an `*Input` with every editable field (create, and the result of a merge),
//! - a `*Patch` with every field optional (partial update).
//!
//! For nullable text fields in a patch, an empty string clears the value.

pub mod page_view;
pub mod portfolio;
pub mod post;
pub mod program;
pub mod service;
pub mod team;
pub mod user;

pub use page_view::{NewPageView, PageView, Utm};
pub use portfolio::{Portfolio, PortfolioInput, PortfolioPatch};
pub use post::{Post, PostFilter, PostInput, PostPatch};
pub use program::{Program, ProgramInput, ProgramPatch};
pub use service::{Service, ServiceInput, ServicePatch};
pub use team::{TeamMember, TeamMemberInput, TeamMemberPatch};
pub use user::{CurrentUser, User};

use thiserror::Error;

/// Visibility flags a partial update sets explicitly. `None` keeps the
/// stored value, so a toggle made since the row was read is not reverted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagChanges {
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Maximum length for titles and names.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Input rejected before reaching the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Offending field.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Trim a required text field and check it is non-empty and not too long.
pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Normalize an optional text field: trimmed, blank becomes `None`.
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Merge a nullable field from a patch: absent keeps, blank clears.
pub(crate) fn merge_nullable(patch: Option<String>, current: Option<&String>) -> Option<String> {
    match patch {
        Some(value) => clean_optional(Some(value)),
        None => current.cloned(),
    }
}

/// Normalize a list of short strings: trimmed, blanks removed.
pub(crate) fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect()
}
