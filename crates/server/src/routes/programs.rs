//! Training program handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use tracing::instrument;

use academy_core::ProgramId;

use super::{CatalogQuery, EntityKey, ReorderItem, ReorderResponse, reorder_rows};
use crate::db::{OrderedTable, ProgramRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Program, ProgramInput, ProgramPatch};
use crate::state::AppState;

/// Build the `/api/programs` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/reorder", patch(reorder))
        .route("/{program}", get(show).put(update).delete(delete))
        .route("/{program}/toggle", patch(toggle_active))
        .route("/{program}/featured", patch(toggle_featured))
}

fn not_found(key: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("program {key}"))
}

/// List programs. `?featured=true` limits to featured ones.
#[instrument(skip(state, caller))]
pub async fn list(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CatalogQuery>,
) -> Result<Json<Vec<Program>>> {
    let programs = ProgramRepository::new(state.pool())
        .list(
            query.include_inactive(caller.as_ref()),
            query.featured.unwrap_or(false),
        )
        .await?;
    Ok(Json(programs))
}

/// Show a program by ID or slug. Inactive programs are staff-only.
#[instrument(skip(state, caller))]
pub async fn show(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> Result<Json<Program>> {
    let repo = ProgramRepository::new(state.pool());
    let program = match EntityKey::parse(&key) {
        Some(EntityKey::Id(id)) => repo.get_by_id(ProgramId::new(id)).await?,
        Some(EntityKey::Slug(slug)) => repo.get_by_slug(&slug).await?,
        None => None,
    }
    .filter(|p| p.is_active || caller.is_some())
    .ok_or_else(|| not_found(&key))?;

    Ok(Json(program))
}

/// Create a program.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppJson(input): AppJson<ProgramInput>,
) -> Result<(StatusCode, Json<Program>)> {
    let input = input.normalized()?;
    let program = ProgramRepository::new(state.pool())
        .create(&input, input.slug()?)
        .await?;

    tracing::info!(program_id = %program.id, "Program created");
    Ok((StatusCode::CREATED, Json(program)))
}

/// Partially update a program.
#[instrument(skip_all, fields(program_id = %id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<ProgramId>,
    AppJson(patch): AppJson<ProgramPatch>,
) -> Result<Json<Program>> {
    let repo = ProgramRepository::new(state.pool());
    let current = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;

    let flags = patch.flags();
    let input = patch.apply(&current).normalized()?;
    Ok(Json(repo.update(id, &input, input.slug()?, flags).await?))
}

/// Flip a program's visibility.
#[instrument(skip_all, fields(program_id = %id))]
pub async fn toggle_active(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<ProgramId>,
) -> Result<Json<Program>> {
    let program = ProgramRepository::new(state.pool()).toggle_active(id).await?;
    tracing::info!(is_active = program.is_active, "Program visibility toggled");
    Ok(Json(program))
}

/// Flip whether a program is featured on the home page.
#[instrument(skip_all, fields(program_id = %id))]
pub async fn toggle_featured(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<ProgramId>,
) -> Result<Json<Program>> {
    let program = ProgramRepository::new(state.pool())
        .toggle_featured(id)
        .await?;
    tracing::info!(is_featured = program.is_featured, "Program featured flag toggled");
    Ok(Json(program))
}

/// Rewrite the display order of several programs at once.
#[instrument(skip_all, fields(count = items.len()))]
pub async fn reorder(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppJson(items): AppJson<Vec<ReorderItem>>,
) -> Result<Json<ReorderResponse>> {
    reorder_rows(&state, OrderedTable::Program, &items).await
}

/// Delete a program.
#[instrument(skip_all, fields(program_id = %id))]
pub async fn delete(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<ProgramId>,
) -> Result<StatusCode> {
    ProgramRepository::new(state.pool()).delete(id).await?;
    tracing::info!("Program deleted");
    Ok(StatusCode::NO_CONTENT)
}
