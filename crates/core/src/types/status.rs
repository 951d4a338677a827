//! Status and classification enums for content entities.
//!
//! Every enum round-trips through its `snake_case` string form, which is the
//! form used in JSON, query strings, and the `PostgreSQL` enum types.

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Implements `as_str`, `Display` and `FromStr` for a unit-only enum.
macro_rules! string_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// All variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The canonical string form.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError::new($kind, s)),
                }
            }
        }
    };
}

/// Staff role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "academy.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access including user management.
    Admin,
    /// Content management and analytics, no user management.
    Editor,
}

string_enum!(UserRole, "user role", {
    Admin => "admin",
    Editor => "editor",
});

/// Kind of post shown on the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "academy.post_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    #[default]
    Blog,
    News,
}

string_enum!(PostType, "post type", {
    Blog => "blog",
    News => "news",
});

/// Publication status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "academy.post_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

string_enum!(PostStatus, "post status", {
    Draft => "draft",
    Published => "published",
});

impl PostStatus {
    /// The opposite status, used by the publish toggle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Draft => Self::Published,
            Self::Published => Self::Draft,
        }
    }

    /// Whether the post is visible on the public site.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Published)
    }
}

/// Target audience level of a training program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "academy.program_level", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProgramLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

string_enum!(ProgramLevel, "program level", {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_post_status_toggle() {
        assert_eq!(PostStatus::Draft.toggled(), PostStatus::Published);
        assert_eq!(PostStatus::Published.toggled(), PostStatus::Draft);
        assert!(PostStatus::Published.is_public());
        assert!(!PostStatus::Draft.is_public());
    }

    #[test]
    fn test_string_forms_match_serde() {
        for role in UserRole::ALL {
            let json = serde_json::to_string(role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), *role);
        }
        for level in ProgramLevel::ALL {
            let json = serde_json::to_string(level).unwrap();
            assert_eq!(json, format!("\"{level}\""));
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "archived".parse::<PostStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid post status: archived");
        assert!("Blog".parse::<PostType>().is_err());
    }
}
