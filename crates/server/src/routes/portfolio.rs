//! Portfolio case study handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use tracing::instrument;

use academy_core::PortfolioId;

use super::{CatalogQuery, EntityKey, ReorderItem, ReorderResponse, reorder_rows};
use crate::db::{OrderedTable, PortfolioRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Portfolio, PortfolioInput, PortfolioPatch};
use crate::state::AppState;

/// Build the `/api/portfolio` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/reorder", patch(reorder))
        .route("/{entry}", get(show).put(update).delete(delete))
        .route("/{entry}/toggle", patch(toggle_active))
        .route("/{entry}/featured", patch(toggle_featured))
}

fn not_found(key: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("portfolio entry {key}"))
}

/// List entries. Supports `?featured=true` and `?category=`.
#[instrument(skip(state, caller))]
pub async fn list(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CatalogQuery>,
) -> Result<Json<Vec<Portfolio>>> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let entries = PortfolioRepository::new(state.pool())
        .list(
            query.include_inactive(caller.as_ref()),
            query.featured.unwrap_or(false),
            category,
        )
        .await?;
    Ok(Json(entries))
}

/// Show an entry by ID or slug. Inactive entries are staff-only.
#[instrument(skip(state, caller))]
pub async fn show(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> Result<Json<Portfolio>> {
    let repo = PortfolioRepository::new(state.pool());
    let entry = match EntityKey::parse(&key) {
        Some(EntityKey::Id(id)) => repo.get_by_id(PortfolioId::new(id)).await?,
        Some(EntityKey::Slug(slug)) => repo.get_by_slug(&slug).await?,
        None => None,
    }
    .filter(|e| e.is_active || caller.is_some())
    .ok_or_else(|| not_found(&key))?;

    Ok(Json(entry))
}

/// Create an entry.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppJson(input): AppJson<PortfolioInput>,
) -> Result<(StatusCode, Json<Portfolio>)> {
    let input = input.normalized()?;
    let entry = PortfolioRepository::new(state.pool())
        .create(&input, input.slug()?)
        .await?;

    tracing::info!(portfolio_id = %entry.id, "Portfolio entry created");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Partially update an entry.
#[instrument(skip_all, fields(portfolio_id = %id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<PortfolioId>,
    AppJson(patch): AppJson<PortfolioPatch>,
) -> Result<Json<Portfolio>> {
    let repo = PortfolioRepository::new(state.pool());
    let current = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;

    let flags = patch.flags();
    let input = patch.apply(&current).normalized()?;
    Ok(Json(repo.update(id, &input, input.slug()?, flags).await?))
}

/// Flip an entry's visibility.
#[instrument(skip_all, fields(portfolio_id = %id))]
pub async fn toggle_active(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<PortfolioId>,
) -> Result<Json<Portfolio>> {
    let entry = PortfolioRepository::new(state.pool())
        .toggle_active(id)
        .await?;
    tracing::info!(is_active = entry.is_active, "Portfolio visibility toggled");
    Ok(Json(entry))
}

/// Flip whether an entry is featured.
#[instrument(skip_all, fields(portfolio_id = %id))]
pub async fn toggle_featured(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<PortfolioId>,
) -> Result<Json<Portfolio>> {
    let entry = PortfolioRepository::new(state.pool())
        .toggle_featured(id)
        .await?;
    tracing::info!(is_featured = entry.is_featured, "Portfolio featured flag toggled");
    Ok(Json(entry))
}

/// Rewrite the display order of several entries at once.
#[instrument(skip_all, fields(count = items.len()))]
pub async fn reorder(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppJson(items): AppJson<Vec<ReorderItem>>,
) -> Result<Json<ReorderResponse>> {
    reorder_rows(&state, OrderedTable::Portfolio, &items).await
}

/// Delete an entry.
#[instrument(skip_all, fields(portfolio_id = %id))]
pub async fn delete(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<PortfolioId>,
) -> Result<StatusCode> {
    PortfolioRepository::new(state.pool()).delete(id).await?;
    tracing::info!("Portfolio entry deleted");
    Ok(StatusCode::NO_CONTENT)
}
