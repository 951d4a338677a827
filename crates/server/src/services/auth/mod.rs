//! Authentication service.
//!
//! Staff accounts sign in with email and password and receive a signed
//! bearer token (HS256 JWT). Tokens are self-contained: verifying one needs
//! no database round trip.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use academy_core::{Email, UserId, UserRole};

use crate::db::{RepositoryError, UserRepository};
use crate::models::{CurrentUser, MAX_TITLE_LENGTH, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (bounds argon2 work on hostile input).
const MAX_PASSWORD_LENGTH: usize = 256;

/// Longest accepted token lifetime (one year).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Hash checked when the email is unknown, so a miss costs the same as a
/// wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("academy-timing-equalizer").ok());

/// JWT claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID, as a decimal string.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i32>()
            .map_err(|_| AuthError::InvalidToken(ErrorKind::InvalidSubject.into()))?;

        Ok(Self {
            id: UserId::new(id),
            email: claims.email,
            name: claims.name,
            role: claims.role,
        })
    }
}

/// Signing and verification keys for bearer tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenKeys {
    /// Build keys from the shared secret.
    ///
    /// Lifetimes above [`MAX_TOKEN_TTL_HOURS`] are clamped.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
            ttl: Duration::hours(ttl_hours.min(MAX_TOKEN_TTL_HOURS)),
        }
    }

    /// Token lifetime in seconds, as reported to clients.
    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue(&self, user: &CurrentUser) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.get().to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::TokenSigning)
    }

    /// Verify a token and return the caller it identifies.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed, expired,
    /// signed with another key, or names a non-numeric subject.
    pub fn verify(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(AuthError::InvalidToken)?;
        CurrentUser::try_from(data.claims)
    }
}

/// Authentication service.
///
/// Handles login, staff registration and credential changes.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    keys: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, keys: &'a TokenKeys) -> Self {
        Self {
            users: UserRepository::new(pool),
            keys,
        }
    }

    /// Login with email and password.
    ///
    /// Returns the user and a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some((user, password_hash)) = self.users.get_with_password_hash(&email).await? else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password_blocking(password, dummy).await;
            }
            return Err(AuthError::InvalidCredentials);
        };

        verify_password_blocking(password, &password_hash).await?;

        let token = self.keys.issue(&CurrentUser::from(&user))?;
        Ok((user, token))
    }

    /// Whether the next registration is the bootstrap of the first account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the count query fails.
    pub async fn is_first_user(&self) -> Result<bool, AuthError> {
        Ok(self.users.count().await? == 0)
    }

    /// Register a new staff user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        role: UserRole,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let name = validate_name(name)?;
        validate_password(password)?;
        let password_hash = hash_password_blocking(password).await?;

        self.users
            .create(&email, name, role, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Change the caller's password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if `current` is wrong, or
    /// `AuthError::WeakPassword` if `new` doesn't meet requirements.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let hash = self
            .users
            .get_password_hash(user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        verify_password_blocking(current, &hash).await?;
        validate_password(new)?;
        if current == new {
            return Err(AuthError::WeakPassword(
                "New password must differ from the current one".to_string(),
            ));
        }

        let new_hash = hash_password_blocking(new).await?;
        self.users.update_password(user_id, &new_hash).await?;
        Ok(())
    }

    /// Update the caller's display name and email, returning a new token
    /// so the claims stay in sync.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email belongs to another
    /// account, or `AuthError::UserNotFound` if the account was deleted.
    pub async fn update_profile(
        &self,
        current: &CurrentUser,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(User, String), AuthError> {
        let user = self
            .users
            .get_by_id(current.id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let name = match name {
            Some(n) => validate_name(n)?,
            None => user.name.as_str(),
        };
        let email = match email {
            Some(e) => Email::parse(e)?,
            None => user.email.clone(),
        };

        let updated = self
            .users
            .update_profile(current.id, name, &email)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        let token = self.keys.issue(&CurrentUser::from(&updated))?;
        Ok((updated, token))
    }
}

// =============================================================================
// Password Utilities
// =============================================================================

/// Validate password requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short or too long.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<&str, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::InvalidName("Name is required".to_string()));
    }
    if name.chars().count() > MAX_TITLE_LENGTH {
        return Err(AuthError::InvalidName(format!(
            "Name must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(name)
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password doesn't match.
/// Returns `AuthError::PasswordHash` if the stored hash is invalid.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// [`hash_password`] on the blocking pool, off the async workers.
async fn hash_password_blocking(password: &str) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

/// [`verify_password`] on the blocking pool, off the async workers.
async fn verify_password_blocking(password: &str, hash: &str) -> Result<(), AuthError> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}
