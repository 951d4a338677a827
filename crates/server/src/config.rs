//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ACADEMY_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ACADEMY_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `ACADEMY_HOST` - Bind address (default: 127.0.0.1)
//! - `ACADEMY_PORT` - Listen port (default: 4000)
//! - `ACADEMY_TOKEN_TTL_HOURS` - Bearer token lifetime, 1 to 8760 (default: 168)
//! - `ACADEMY_CORS_ORIGINS` - Comma-separated allowed origins (default: any);
//!   their hosts also count as the site itself in referrer attribution
//! - `ACADEMY_UPLOAD_DIR` - Directory for uploaded images (default: uploads)
//! - `ACADEMY_PUBLIC_UPLOAD_PATH` - URL prefix uploads are served under, not `/` (default: /uploads)
//! - `ACADEMY_MAX_UPLOAD_BYTES` - Maximum image size (default: 5 MiB)
//! - `ACADEMY_LOCALES` - Comma-separated supported locales (default: en)
//! - `ACADEMY_DEFAULT_LOCALE` - Fallback locale (default: first of `ACADEMY_LOCALES`)
//! - `ACADEMY_LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::services::analytics::referrer_host;
use crate::services::auth::MAX_TOKEN_TTL_HOURS;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token settings
    pub auth: AuthConfig,
    /// Origins allowed by CORS; empty means any origin
    pub cors_origins: Vec<String>,
    /// Image upload settings
    pub uploads: UploadConfig,
    /// Translation locales
    pub i18n: I18nConfig,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Bearer token configuration.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens
    pub jwt_secret: SecretString,
    /// Token lifetime in hours
    pub token_ttl_hours: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

/// Image upload configuration.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Filesystem directory uploads are written to
    pub dir: PathBuf,
    /// URL path prefix uploads are served from
    pub public_path: String,
    /// Largest accepted upload in bytes
    pub max_bytes: usize,
}

/// Locale configuration for the translation dictionary.
#[derive(Debug, Clone)]
pub struct I18nConfig {
    /// Supported locales, in display order
    pub locales: Vec<String>,
    /// Locale used to fill keys missing from other locales
    pub default_locale: String,
}

impl I18nConfig {
    /// Whether `locale` is one of the configured locales.
    #[must_use]
    pub fn supports(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ACADEMY_DATABASE_URL")?;
        let host = parse_env("ACADEMY_HOST", "127.0.0.1")?;
        let port = parse_env("ACADEMY_PORT", "4000")?;

        let jwt_secret = get_validated_secret("ACADEMY_JWT_SECRET")?;
        validate_secret_length(&jwt_secret, "ACADEMY_JWT_SECRET")?;
        let token_ttl_hours = validate_token_ttl(parse_env("ACADEMY_TOKEN_TTL_HOURS", "168")?)?;

        let cors_origins = split_list(&get_env_or_default("ACADEMY_CORS_ORIGINS", ""));

        let uploads = UploadConfig {
            dir: PathBuf::from(get_env_or_default("ACADEMY_UPLOAD_DIR", "uploads")),
            public_path: normalize_public_path(&get_env_or_default(
                "ACADEMY_PUBLIC_UPLOAD_PATH",
                "/uploads",
            ))?,
            max_bytes: parse_env(
                "ACADEMY_MAX_UPLOAD_BYTES",
                &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
            )?,
        };

        let i18n = parse_locales(
            &get_env_or_default("ACADEMY_LOCALES", "en"),
            get_optional_env("ACADEMY_DEFAULT_LOCALE").as_deref(),
        )?;

        let json_logs = get_optional_env("ACADEMY_LOG_FORMAT").is_some_and(|f| f == "json");

        Ok(Self {
            database_url,
            host,
            port,
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours,
            },
            cors_origins,
            uploads,
            i18n,
            json_logs,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Hosts of the site's own frontends, taken from the CORS origins.
    /// Referrers from these hosts are not credited as referrals.
    #[must_use]
    pub fn site_hosts(&self) -> Vec<String> {
        self.cors_origins
            .iter()
            .filter_map(|origin| referrer_host(origin))
            .collect()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into any `FromStr` type.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Split a comma-separated list, dropping blanks.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Token lifetime must be positive and at most [`MAX_TOKEN_TTL_HOURS`].
fn validate_token_ttl(hours: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        return Ok(hours);
    }
    Err(ConfigError::InvalidEnvVar(
        "ACADEMY_TOKEN_TTL_HOURS".to_string(),
        format!("must be between 1 and {MAX_TOKEN_TTL_HOURS}"),
    ))
}

/// Ensure the public upload path has exactly one leading and no trailing
/// slash. The root path would shadow the API and is rejected.
fn normalize_public_path(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "ACADEMY_PUBLIC_UPLOAD_PATH".to_string(),
            "must not be the site root".to_string(),
        ));
    }
    Ok(format!("/{trimmed}"))
}

/// Build the locale configuration, validating the default locale.
fn parse_locales(raw: &str, default: Option<&str>) -> Result<I18nConfig, ConfigError> {
    let locales: Vec<String> = split_list(raw)
        .into_iter()
        .map(|l| l.to_lowercase())
        .collect();

    let Some(first) = locales.first().cloned() else {
        return Err(ConfigError::InvalidEnvVar(
            "ACADEMY_LOCALES".to_string(),
            "at least one locale is required".to_string(),
        ));
    };

    let default_locale = default.map_or(first, str::to_lowercase);
    if !locales.contains(&default_locale) {
        return Err(ConfigError::InvalidEnvVar(
            "ACADEMY_DEFAULT_LOCALE".to_string(),
            format!("{default_locale} is not listed in ACADEMY_LOCALES"),
        ));
    }

    Ok(I18nConfig {
        locales,
        default_locale,
    })
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength() {
        assert!(matches!(
            validate_secret_strength("changeme-please-now", "T"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
        assert!(validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "T").is_err());
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "T").is_ok());
    }

    #[test]
    fn test_validate_secret_length() {
        assert!(validate_secret_length(&SecretString::from("short"), "T").is_err());
        assert!(validate_secret_length(&SecretString::from("k".repeat(32)), "T").is_ok());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" https://a.io, ,https://b.io "),
            vec!["https://a.io".to_string(), "https://b.io".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_normalize_public_path() {
        assert_eq!(normalize_public_path("uploads").unwrap(), "/uploads");
        assert_eq!(
            normalize_public_path("/media/images/").unwrap(),
            "/media/images"
        );
    }

    #[test]
    fn test_root_public_path_rejected() {
        for raw in ["/", "", "  //  "] {
            assert!(matches!(
                normalize_public_path(raw),
                Err(ConfigError::InvalidEnvVar(_, _))
            ));
        }
    }

    #[test]
    fn test_validate_token_ttl_bounds() {
        assert_eq!(validate_token_ttl(168).unwrap(), 168);
        assert_eq!(
            validate_token_ttl(MAX_TOKEN_TTL_HOURS).unwrap(),
            MAX_TOKEN_TTL_HOURS
        );
        assert!(validate_token_ttl(0).is_err());
        assert!(validate_token_ttl(-5).is_err());
        assert!(validate_token_ttl(MAX_TOKEN_TTL_HOURS + 1).is_err());
        assert!(validate_token_ttl(i64::MAX).is_err());
    }

    #[test]
    fn test_parse_locales_defaults_to_first() {
        let i18n = parse_locales("EN, ru, uz", None).unwrap();
        assert_eq!(i18n.locales, vec!["en", "ru", "uz"]);
        assert_eq!(i18n.default_locale, "en");
        assert!(i18n.supports("ru"));
        assert!(!i18n.supports("de"));
    }

    #[test]
    fn test_parse_locales_rejects_unknown_default() {
        assert!(parse_locales("en,ru", Some("de")).is_err());
        assert!(parse_locales(" , ", None).is_err());
        assert_eq!(
            parse_locales("en,ru", Some("RU")).unwrap().default_locale,
            "ru"
        );
    }

    #[test]
    fn test_auth_config_debug_redacts_secret() {
        let auth = AuthConfig {
            jwt_secret: SecretString::from("super_sensitive_signing_key"),
            token_ttl_hours: 24,
        };
        let debug_output = format!("{auth:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_sensitive_signing_key"));
    }
}
