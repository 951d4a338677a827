//! Service catalog handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use tracing::instrument;

use academy_core::ServiceId;

use super::{CatalogQuery, EntityKey, ReorderItem, ReorderResponse, reorder_rows};
use crate::db::{OrderedTable, ServiceRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Service, ServiceInput, ServicePatch};
use crate::state::AppState;

/// Build the `/api/services` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/reorder", patch(reorder))
        .route("/{service}", get(show).put(update).delete(delete))
        .route("/{service}/toggle", patch(toggle_active))
}

fn not_found(key: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("service {key}"))
}

/// List services in display order. Staff may pass `?all=true`.
#[instrument(skip(state, caller))]
pub async fn list(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CatalogQuery>,
) -> Result<Json<Vec<Service>>> {
    let services = ServiceRepository::new(state.pool())
        .list(query.include_inactive(caller.as_ref()))
        .await?;
    Ok(Json(services))
}

/// Show a service by ID or slug. Inactive services are staff-only.
#[instrument(skip(state, caller))]
pub async fn show(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> Result<Json<Service>> {
    let repo = ServiceRepository::new(state.pool());
    let service = match EntityKey::parse(&key) {
        Some(EntityKey::Id(id)) => repo.get_by_id(ServiceId::new(id)).await?,
        Some(EntityKey::Slug(slug)) => repo.get_by_slug(&slug).await?,
        None => None,
    }
    .filter(|s| s.is_active || caller.is_some())
    .ok_or_else(|| not_found(&key))?;

    Ok(Json(service))
}

/// Create a service.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppJson(input): AppJson<ServiceInput>,
) -> Result<(StatusCode, Json<Service>)> {
    let input = input.normalized()?;
    let service = ServiceRepository::new(state.pool())
        .create(&input, input.slug()?)
        .await?;

    tracing::info!(service_id = %service.id, "Service created");
    Ok((StatusCode::CREATED, Json(service)))
}

/// Partially update a service.
#[instrument(skip_all, fields(service_id = %id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<ServiceId>,
    AppJson(patch): AppJson<ServicePatch>,
) -> Result<Json<Service>> {
    let repo = ServiceRepository::new(state.pool());
    let current = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;

    let is_active = patch.is_active;
    let input = patch.apply(&current).normalized()?;
    Ok(Json(repo.update(id, &input, input.slug()?, is_active).await?))
}

/// Flip a service's visibility.
#[instrument(skip_all, fields(service_id = %id))]
pub async fn toggle_active(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<ServiceId>,
) -> Result<Json<Service>> {
    let service = ServiceRepository::new(state.pool()).toggle_active(id).await?;
    tracing::info!(is_active = service.is_active, "Service visibility toggled");
    Ok(Json(service))
}

/// Rewrite the display order of several services at once.
#[instrument(skip_all, fields(count = items.len()))]
pub async fn reorder(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppJson(items): AppJson<Vec<ReorderItem>>,
) -> Result<Json<ReorderResponse>> {
    reorder_rows(&state, OrderedTable::Service, &items).await
}

/// Delete a service.
#[instrument(skip_all, fields(service_id = %id))]
pub async fn delete(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<ServiceId>,
) -> Result<StatusCode> {
    ServiceRepository::new(state.pool()).delete(id).await?;
    tracing::info!("Service deleted");
    Ok(StatusCode::NO_CONTENT)
}
