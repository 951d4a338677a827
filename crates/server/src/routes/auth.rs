//! Authentication and staff account handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use academy_core::UserRole;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::AppJson;
use crate::middleware::{OptionalAuth, RequireAdmin, RequireAuth, auth_rate_limiter};
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Build the `/api/auth` router (rate limited).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/password", put(change_password))
        .layer(auth_rate_limiter())
        .route("/me", get(me))
        .route("/profile", put(update_profile))
}

/// Build the `/api/users` router.
pub fn users_router() -> Router<AppState> {
    Router::new().route("/", get(list_users))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued token and the account it belongs to.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

/// Staff registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Profile update request body.
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Password change request body.
#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Sign in with email and password.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let keys = state.token_keys();
    let auth = AuthService::new(state.pool(), keys);

    let (user, token) = auth
        .login(&body.email, &body.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "Login failed"))?;

    tracing::info!(user_id = %user.id, "Login succeeded");
    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer",
        expires_in: keys.ttl_seconds(),
        user,
    }))
}

/// The authenticated caller's account.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn me(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))
}

/// Create a staff account.
///
/// Open while no accounts exist (the first account is always an admin);
/// afterwards only admins may register new staff.
#[instrument(skip(state, caller, body), fields(email = %body.email))]
pub async fn register(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let auth = AuthService::new(state.pool(), state.token_keys());

    let role = if auth.is_first_user().await? {
        UserRole::Admin
    } else {
        match caller {
            Some(ref user) if user.is_admin() => body.role.unwrap_or(UserRole::Editor),
            Some(_) => return Err(AppError::Forbidden("Admin access required".to_string())),
            None => {
                return Err(AppError::Unauthorized(
                    "Authentication required".to_string(),
                ));
            }
        }
    };

    let user = auth
        .register(&body.email, &body.name, role, &body.password)
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "Staff account created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update the caller's name or email and reissue the token.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppJson(body): AppJson<ProfileRequest>,
) -> Result<Json<TokenResponse>> {
    let keys = state.token_keys();
    let (updated, token) = AuthService::new(state.pool(), keys)
        .update_profile(&user, body.name.as_deref(), body.email.as_deref())
        .await?;

    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer",
        expires_in: keys.ttl_seconds(),
        user: updated,
    }))
}

/// Change the caller's password.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn change_password(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppJson(body): AppJson<PasswordRequest>,
) -> Result<StatusCode> {
    AuthService::new(state.pool(), state.token_keys())
        .change_password(user.id, &body.current_password, &body.new_password)
        .await?;

    tracing::info!("Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// List staff accounts.
#[instrument(skip_all, fields(user_id = %admin.id))]
pub async fn list_users(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(UserRepository::new(state.pool()).list().await?))
}
