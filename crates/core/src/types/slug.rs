//! URL slug type.
//!
//! Posts, services, programs and portfolio entries are addressed by slug on
//! the public site. A slug is lowercase ASCII letters and digits separated by
//! single hyphens.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("slug may only contain lowercase letters, digits and hyphens")]
    InvalidCharacter,
    /// Leading, trailing or doubled hyphen.
    #[error("slug cannot start or end with a hyphen or contain '--'")]
    MisplacedHyphen,
}

/// A validated URL slug.
///
/// ```
/// use academy_core::Slug;
///
/// assert_eq!(Slug::parse("intro-to-ml").unwrap().as_str(), "intro-to-ml");
/// assert!(Slug::parse("Intro to ML").is_err());
///
/// let slug = Slug::from_title("Intro to Machine Learning: Part 1!").unwrap();
/// assert_eq!(slug.as_str(), "intro-to-machine-learning-part-1");
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum slug length.
    pub const MAX_LENGTH: usize = 200;

    /// Parse an already-formed slug.
    ///
    /// # Errors
    ///
    /// Returns a [`SlugError`] if the input is not a canonical slug.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(SlugError::InvalidCharacter);
        }
        if s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::MisplacedHyphen);
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a human title, transliterating non-ASCII text.
    ///
    /// Titles longer than [`Self::MAX_LENGTH`] are cut at the last hyphen
    /// that fits.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if the title has no sluggable characters.
    pub fn from_title(title: &str) -> Result<Self, SlugError> {
        let mut slug = ::slug::slugify(title);
        if slug.len() > Self::MAX_LENGTH {
            let cut = slug
                .get(..=Self::MAX_LENGTH)
                .and_then(|head| head.rfind('-'))
                .unwrap_or(Self::MAX_LENGTH);
            slug.truncate(cut);
        }
        Self::parse(slug.trim_matches('-'))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Slug {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        for s in ["a", "ai-101", "deep-learning-bootcamp-2025"] {
            assert!(Slug::parse(s).is_ok(), "{s} should be valid");
        }
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
        assert_eq!(Slug::parse("Upper"), Err(SlugError::InvalidCharacter));
        assert_eq!(Slug::parse("with space"), Err(SlugError::InvalidCharacter));
        assert_eq!(Slug::parse("-lead"), Err(SlugError::MisplacedHyphen));
        assert_eq!(Slug::parse("trail-"), Err(SlugError::MisplacedHyphen));
        assert_eq!(Slug::parse("dou--ble"), Err(SlugError::MisplacedHyphen));
    }

    #[test]
    fn test_from_title_transliterates() {
        let slug = Slug::from_title("Café & Crème: Données").unwrap();
        assert_eq!(slug.as_str(), "cafe-creme-donnees");
    }

    #[test]
    fn test_from_title_empty() {
        assert_eq!(Slug::from_title("!!!"), Err(SlugError::Empty));
    }

    #[test]
    fn test_from_title_truncates_on_word_boundary() {
        let title = "word ".repeat(80);
        let slug = Slug::from_title(&title).unwrap();
        assert!(slug.as_str().len() <= Slug::MAX_LENGTH);
        assert!(slug.as_str().ends_with("word"));
    }
}
