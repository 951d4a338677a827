//! Multi-language translation dictionaries.
//!
//! Each locale stores flat dotted keys (`nav.home`). Reading a locale merges
//! it over the default locale so missing keys fall back. Merged dictionaries
//! are cached with `moka` (5-minute TTL) and invalidated on every write.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::{Map, Value};
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::config::I18nConfig;
use crate::db::{RepositoryError, TranslationRepository};

/// Flat key → text map for one locale.
pub type Dictionary = BTreeMap<String, String>;

/// Maximum key length.
pub const MAX_KEY_LENGTH: usize = 200;

/// Maximum value length in characters.
pub const MAX_VALUE_LENGTH: usize = 10_000;

/// Key under which a leaf is kept when the same path also has children.
pub const LEAF_KEY: &str = "_";

/// Errors for translation operations.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("unsupported locale: {0}")]
    UnknownLocale(String),

    #[error("invalid translation key '{0}': use 1-200 characters of a-z, 0-9, '_', '.', '-'")]
    InvalidKey(String),

    #[error("translation for '{0}' is longer than {MAX_VALUE_LENGTH} characters")]
    ValueTooLong(String),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Check a dotted key: lowercase ascii, digits, `_`, `.`, `-`; no empty segments.
///
/// # Errors
///
/// Returns `TranslationError::InvalidKey` if the key is malformed.
pub fn validate_key(key: &str) -> Result<(), TranslationError> {
    let charset_ok = key
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'_' | b'.' | b'-'));
    let segments_ok = key.split('.').all(|segment| !segment.is_empty());

    if key.is_empty() || key.len() > MAX_KEY_LENGTH || !charset_ok || !segments_ok {
        return Err(TranslationError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

/// Validate a batch of entries before writing.
///
/// # Errors
///
/// Returns the first invalid key or oversized value.
pub fn validate_entries(entries: &Dictionary) -> Result<(), TranslationError> {
    for (key, value) in entries {
        validate_key(key)?;
        if value.chars().count() > MAX_VALUE_LENGTH {
            return Err(TranslationError::ValueTooLong(key.clone()));
        }
    }
    Ok(())
}

/// Overlay `requested` on `default`: requested values win key by key.
#[must_use]
pub fn merge(default: &Dictionary, requested: &Dictionary) -> Dictionary {
    let mut merged = default.clone();
    merged.extend(requested.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Expand dotted keys into nested JSON objects.
///
/// A key that is both a leaf and a prefix (`nav` and `nav.home`) keeps its
/// own value under [`LEAF_KEY`].
#[must_use]
pub fn nest(dictionary: &Dictionary) -> Value {
    let mut root = Map::new();
    for (key, value) in dictionary {
        insert_path(&mut root, key.split('.'), value);
    }
    Value::Object(root)
}

fn insert_path<'a>(
    map: &mut Map<String, Value>,
    mut segments: impl Iterator<Item = &'a str>,
    value: &str,
) {
    let Some(head) = segments.next() else {
        return;
    };
    let rest: Vec<&str> = segments.collect();

    if rest.is_empty() {
        match map.get_mut(head) {
            Some(Value::Object(children)) => {
                children.insert(LEAF_KEY.to_owned(), Value::String(value.to_owned()));
            }
            _ => {
                map.insert(head.to_owned(), Value::String(value.to_owned()));
            }
        }
        return;
    }

    let slot = map
        .entry(head.to_owned())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::String(leaf) = &mut *slot {
        let mut children = Map::new();
        children.insert(LEAF_KEY.to_owned(), Value::String(std::mem::take(leaf)));
        *slot = Value::Object(children);
    }
    if let Value::Object(children) = slot {
        insert_path(children, rest.into_iter(), value);
    }
}

/// Per-locale cache of merged dictionaries.
#[derive(Clone)]
pub struct TranslationCache {
    cache: Cache<String, Arc<Dictionary>>,
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(64)
                .time_to_live(Duration::from_secs(300))
                .build(),
        }
    }

    /// The merged dictionary for `locale`, loading it on a cache miss.
    ///
    /// # Errors
    ///
    /// Returns `TranslationError::UnknownLocale` for a locale outside the
    /// configured list, or `TranslationError::Repository` if loading fails.
    pub async fn merged(
        &self,
        pool: &PgPool,
        i18n: &I18nConfig,
        locale: &str,
    ) -> Result<Arc<Dictionary>, TranslationError> {
        if !i18n.supports(locale) {
            return Err(TranslationError::UnknownLocale(locale.to_owned()));
        }

        if let Some(hit) = self.cache.get(locale).await {
            debug!(locale, "Translation cache hit");
            return Ok(hit);
        }

        let repo = TranslationRepository::new(pool);
        let requested = repo.list_locale(locale).await?;
        let dictionary = if locale == i18n.default_locale {
            requested
        } else {
            let default = repo.list_locale(&i18n.default_locale).await?;
            merge(&default, &requested)
        };

        let dictionary = Arc::new(dictionary);
        self.cache
            .insert(locale.to_owned(), Arc::clone(&dictionary))
            .await;
        Ok(dictionary)
    }

    /// Drop cached dictionaries affected by a write to `locale`.
    ///
    /// Writing the default locale can change every merged dictionary.
    pub async fn invalidate(&self, i18n: &I18nConfig, locale: &str) {
        if locale == i18n.default_locale {
            self.cache.invalidate_all();
        } else {
            self.cache.invalidate(locale).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dict(pairs: &[(&str, &str)]) -> Dictionary {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("nav.home").is_ok());
        assert!(validate_key("hero.cta-primary_2").is_ok());
        for bad in ["", "Nav.home", "nav..home", ".nav", "nav.", "nav home", "навигация"] {
            assert!(validate_key(bad).is_err(), "{bad}");
        }
        assert!(validate_key(&"a".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_entries_rejects_long_values() {
        let entries = dict(&[("ok", "fine")]);
        assert!(validate_entries(&entries).is_ok());
        let entries = Dictionary::from([("big".to_owned(), "x".repeat(MAX_VALUE_LENGTH + 1))]);
        assert!(matches!(
            validate_entries(&entries),
            Err(TranslationError::ValueTooLong(_))
        ));
    }

    #[test]
    fn test_merge_falls_back_to_default() {
        let en = dict(&[("nav.home", "Home"), ("nav.blog", "Blog")]);
        let uk = dict(&[("nav.home", "Головна")]);
        let merged = merge(&en, &uk);
        assert_eq!(merged["nav.home"], "Головна");
        assert_eq!(merged["nav.blog"], "Blog");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_nest() {
        let nested = nest(&dict(&[
            ("nav.home", "Home"),
            ("nav.blog", "Blog"),
            ("title", "Academy"),
        ]));
        assert_eq!(
            nested,
            json!({"nav": {"home": "Home", "blog": "Blog"}, "title": "Academy"})
        );
    }

    #[test]
    fn test_nest_keeps_leaf_that_is_also_prefix() {
        // BTreeMap order puts "hero" before "hero.title".
        let nested = nest(&dict(&[("hero", "Welcome"), ("hero.title", "Learn AI")]));
        assert_eq!(nested, json!({"hero": {"_": "Welcome", "title": "Learn AI"}}));

        let mut map = Map::new();
        insert_path(&mut map, "a.b".split('.'), "child");
        insert_path(&mut map, "a".split('.'), "leaf");
        assert_eq!(Value::Object(map), json!({"a": {"_": "leaf", "b": "child"}}));
    }
}
