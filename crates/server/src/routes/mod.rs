//! HTTP route handlers for the API server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready         - Liveness / readiness
//!
//! # Auth (rate limited where credentials are checked)
//! POST /api/auth/login                - Email + password → bearer token
//! GET  /api/auth/me                   - Current account
//! PUT  /api/auth/profile              - Update name / email
//! PUT  /api/auth/password             - Change password
//! POST /api/auth/register             - Create staff (admin, or first account)
//! GET  /api/users                     - Staff list (admin)
//!
//! # Content
//! /api/posts                          - Blog and news, paginated
//! /api/services, /api/programs,
//! /api/team, /api/portfolio           - Ordered catalogs with toggle + reorder
//!
//! # Analytics
//! POST /api/analytics/track|duration  - Public beacons (rate limited)
//! GET  /api/analytics/overview|trends|sources|realtime
//! POST /api/analytics/campaign-link
//!
//! # Translations and media
//! /api/translations                   - Locale dictionaries
//! POST /api/upload/image              - Multipart image upload
//! GET  /uploads/*                     - Uploaded files
//! ```

pub mod analytics;
pub mod auth;
pub mod health;
pub mod portfolio;
pub mod posts;
pub mod programs;
pub mod services;
pub mod team;
pub mod translations;
pub mod upload;

use std::time::Duration;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderValue, Method, Request, Response,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use academy_core::Slug;

use crate::config::ServerConfig;
use crate::db::{self, OrderedTable};
use crate::error::{AppError, Result};
use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Headroom over the image limit for multipart framing.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Most rows accepted by one reorder request.
const MAX_REORDER_ITEMS: usize = 500;

// =============================================================================
// Shared Request Types
// =============================================================================

/// Query parameters shared by catalog listings.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Include inactive rows; honored for staff only.
    pub all: Option<bool>,
    /// Only featured rows (programs and portfolio).
    pub featured: Option<bool>,
    /// Category filter (portfolio).
    pub category: Option<String>,
}

impl CatalogQuery {
    /// Whether inactive rows should be listed for this caller.
    #[must_use]
    pub fn include_inactive(&self, caller: Option<&CurrentUser>) -> bool {
        caller.is_some() && self.all.unwrap_or(false)
    }
}

/// New position for one catalog row.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReorderItem {
    pub id: i32,
    pub display_order: i32,
}

/// Rows changed by a reorder.
#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub updated: u64,
}

/// Apply a reorder request to one catalog table.
async fn reorder_rows(
    state: &AppState,
    table: OrderedTable,
    items: &[ReorderItem],
) -> Result<Json<ReorderResponse>> {
    if items.len() > MAX_REORDER_ITEMS {
        return Err(AppError::BadRequest(format!(
            "at most {MAX_REORDER_ITEMS} items can be reordered at once"
        )));
    }

    let pairs: Vec<(i32, i32)> = items.iter().map(|i| (i.id, i.display_order)).collect();
    let updated = db::reorder(state.pool(), table, &pairs).await?;

    tracing::info!(?table, updated, "Display order rewritten");
    Ok(Json(ReorderResponse { updated }))
}

/// Path key that is either a numeric ID or a slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKey {
    Id(i32),
    Slug(Slug),
}

impl EntityKey {
    /// Parse a path segment; `None` if it is neither.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if let Ok(id) = raw.parse::<i32>() {
            return Some(Self::Id(id));
        }
        Slug::parse(raw).ok().map(Self::Slug)
    }
}

// =============================================================================
// Router
// =============================================================================

/// Create all `/api` routes.
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    let upload_limit = config
        .uploads
        .max_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", auth::users_router())
        .nest("/posts", posts::router())
        .nest("/services", services::router())
        .nest("/programs", programs::router())
        .nest("/team", team::router())
        .nest("/portfolio", portfolio::router())
        .nest("/analytics", analytics::router())
        .nest("/translations", translations::router())
        .nest(
            "/upload",
            upload::router().layer(DefaultBodyLimit::max(upload_limit)),
        )
}

/// Build the CORS layer. No configured origins means any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

/// Build the complete application with its middleware stack.
///
/// Sentry layers are added by the binary around this router.
pub fn app(state: AppState) -> Router {
    let config = state.config();

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes(config))
        .nest_service(
            &config.uploads.public_path,
            ServeDir::new(&config.uploads.dir),
        )
        .layer(cors_layer(&config.cors_origins))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use axum::body::Body;
    use axum::http::StatusCode;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::config::{AuthConfig, I18nConfig, UploadConfig};
    use crate::services::auth::TokenKeys;
    use academy_core::{UserId, UserRole};

    const SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

    fn config() -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/academy_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 4000,
            auth: AuthConfig {
                jwt_secret: SecretString::from(SECRET),
                token_ttl_hours: 1,
            },
            cors_origins: vec!["https://academy.io".to_string()],
            uploads: UploadConfig {
                dir: PathBuf::from("target/test-uploads"),
                public_path: "/uploads".to_string(),
                max_bytes: 1024,
            },
            i18n: I18nConfig {
                locales: vec!["en".to_string(), "ru".to_string()],
                default_locale: "en".to_string(),
            },
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Router over a pool that never connects; only paths that fail before
    /// touching the database can be exercised.
    fn test_app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/academy_test")
            .unwrap();
        app(AppState::new(config(), pool))
    }

    fn token(role: UserRole) -> String {
        let keys = TokenKeys::new(&SecretString::from(SECRET), 1);
        keys.issue(&CurrentUser {
            id: UserId::new(1),
            email: "staff@academy.io".to_string(),
            name: "Staff".to_string(),
            role,
        })
        .unwrap()
    }

    async fn send(request: Request<Body>) -> Response<Body> {
        test_app().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
    }

    #[tokio::test]
    async fn test_writes_require_token() {
        for (method, uri) in [
            ("POST", "/api/posts"),
            ("PUT", "/api/posts/1"),
            ("DELETE", "/api/services/1"),
            ("PATCH", "/api/programs/1/featured"),
            ("PATCH", "/api/team/reorder"),
            ("GET", "/api/analytics/overview"),
            ("PUT", "/api/translations/en"),
            ("POST", "/api/upload/image"),
            ("GET", "/api/auth/me"),
        ] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap();
            let response = send(request).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(
                response.headers().get("cache-control").unwrap(),
                "no-store"
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_token_rejected() {
        let request = Request::get("/api/analytics/realtime")
            .header(AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(request).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_users_list_requires_admin() {
        let request = Request::get("/api/users")
            .header(AUTHORIZATION, format!("Bearer {}", token(UserRole::Editor)))
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(request).await.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_campaign_link_needs_no_database() {
        let request = Request::post("/api/analytics/campaign-link")
            .header(AUTHORIZATION, format!("Bearer {}", token(UserRole::Editor)))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"url": "https://academy.io/programs", "source": "newsletter",
                    "medium": "email", "campaign": "autumn"}"#,
            ))
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["url"],
            "https://academy.io/programs?utm_source=newsletter&utm_medium=email&utm_campaign=autumn"
        );
    }

    #[tokio::test]
    async fn test_unknown_locale_is_not_found() {
        let response = send(
            Request::get("/api/translations/de")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_track_rejects_bad_beacon_before_storage() {
        let request = Request::post("/api/analytics/track")
            .header(CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.5")
            .body(Body::from(r#"{"session_id": "short", "path": "/"}"#))
            .unwrap();
        assert_eq!(send(request).await.status(), StatusCode::BAD_REQUEST);
    }

    async fn assert_json_error(response: Response<Body>, status: StatusCode) {
        assert_eq!(response.status(), status);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].is_string());
    }

    fn track(body: &'static str) -> Request<Body> {
        Request::post("/api/analytics/track")
            .header(CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_malformed_json_is_json_bad_request() {
        assert_json_error(send(track("{not json")).await, StatusCode::BAD_REQUEST).await;
    }

    #[tokio::test]
    async fn test_missing_field_is_json_bad_request() {
        assert_json_error(send(track(r#"{"path": "/"}"#)).await, StatusCode::BAD_REQUEST).await;
    }

    #[tokio::test]
    async fn test_bad_path_and_query_are_json_bad_requests() {
        let request = Request::put("/api/posts/not-a-number")
            .header(AUTHORIZATION, format!("Bearer {}", token(UserRole::Editor)))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        assert_json_error(send(request).await, StatusCode::BAD_REQUEST).await;

        let request = Request::get("/api/posts?page=abc")
            .body(Body::empty())
            .unwrap();
        assert_json_error(send(request).await, StatusCode::BAD_REQUEST).await;
    }

    #[tokio::test]
    async fn test_auth_rate_limit_is_json_too_many_requests() {
        let app = test_app();
        let login = || {
            Request::post("/api/auth/login")
                .header(CONTENT_TYPE, "application/json")
                .header("x-forwarded-for", "198.51.100.20")
                .body(Body::from("{"))
                .unwrap()
        };

        for _ in 0..5 {
            let response = app.clone().oneshot(login()).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        let response = app.oneshot(login()).await.unwrap();
        assert_json_error(response, StatusCode::TOO_MANY_REQUESTS).await;
    }

    #[test]
    fn test_site_hosts_come_from_cors_origins() {
        let mut config = config();
        config.cors_origins = vec![
            "https://www.academy.io".to_string(),
            "http://localhost:3000".to_string(),
            "*".to_string(),
        ];
        assert_eq!(config.site_hosts(), vec!["academy.io", "localhost"]);
    }

    #[test]
    fn test_entity_key() {
        assert_eq!(EntityKey::parse("42"), Some(EntityKey::Id(42)));
        assert_eq!(
            EntityKey::parse("ai-consulting"),
            Some(EntityKey::Slug(Slug::parse("ai-consulting").unwrap()))
        );
        assert_eq!(EntityKey::parse("Not A Slug"), None);
    }

    #[test]
    fn test_include_inactive_requires_staff() {
        let query = CatalogQuery {
            all: Some(true),
            ..CatalogQuery::default()
        };
        assert!(!query.include_inactive(None));
        let staff = CurrentUser {
            id: UserId::new(1),
            email: "staff@academy.io".to_string(),
            name: "Staff".to_string(),
            role: UserRole::Editor,
        };
        assert!(query.include_inactive(Some(&staff)));
        assert!(!CatalogQuery::default().include_inactive(Some(&staff)));
    }
}
