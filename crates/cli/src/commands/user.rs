//! Staff account management.
//!
//! # Environment Variables
//!
//! - `ACADEMY_DATABASE_URL` - `PostgreSQL` connection string
//! - `ACADEMY_SEED_PASSWORD` - Password used when `--password` is omitted

use academy_core::{Email, UserRole};
use academy_server::db::{RepositoryError, UserRepository};
use academy_server::services::auth::{hash_password, validate_password};

use super::{CommandError, connect};

/// Create a staff user.
///
/// # Arguments
///
/// * `email` - Login email
/// * `name` - Display name
/// * `role` - `admin` or `editor`
/// * `password` - Password; `ACADEMY_SEED_PASSWORD` is used when `None`
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns an error for an invalid role, email or password, a missing
/// password, a duplicate email, or a database failure.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    password: Option<String>,
) -> Result<i32, CommandError> {
    dotenvy::dotenv().ok();

    let role: UserRole = role
        .parse()
        .map_err(|_| CommandError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|_| CommandError::InvalidEmail(email.to_owned()))?;

    let password = match password {
        Some(password) => password,
        None => std::env::var("ACADEMY_SEED_PASSWORD")
            .map_err(|_| CommandError::MissingEnvVar("ACADEMY_SEED_PASSWORD"))?,
    };
    validate_password(&password)?;
    let password_hash = hash_password(&password)?;

    let pool = connect().await?;
    let repo = UserRepository::new(&pool);

    tracing::info!("Creating user: {} ({})", email, role);

    if repo.get_by_email(&email).await?.is_some() {
        return Err(CommandError::UserExists(email.to_string()));
    }

    let user = repo
        .create(&email, name.trim(), role, &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CommandError::UserExists(email.to_string()),
            other => CommandError::Repository(other),
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(user.id.get())
}
