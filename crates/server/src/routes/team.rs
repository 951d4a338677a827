//! Team page handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use tracing::instrument;

use academy_core::TeamMemberId;

use super::{CatalogQuery, ReorderItem, ReorderResponse, reorder_rows};
use crate::db::{OrderedTable, TeamRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{TeamMember, TeamMemberInput, TeamMemberPatch};
use crate::state::AppState;

/// Build the `/api/team` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/reorder", patch(reorder))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/toggle", patch(toggle_active))
}

fn not_found(id: TeamMemberId) -> AppError {
    AppError::NotFound(format!("team member {id}"))
}

/// List team members in display order.
#[instrument(skip(state, caller))]
pub async fn list(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CatalogQuery>,
) -> Result<Json<Vec<TeamMember>>> {
    let members = TeamRepository::new(state.pool())
        .list(query.include_inactive(caller.as_ref()))
        .await?;
    Ok(Json(members))
}

/// Show one team member. Inactive profiles are staff-only.
#[instrument(skip(state, caller))]
pub async fn show(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<TeamMemberId>,
) -> Result<Json<TeamMember>> {
    TeamRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .filter(|m| m.is_active || caller.is_some())
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// Add a team member.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppJson(input): AppJson<TeamMemberInput>,
) -> Result<(StatusCode, Json<TeamMember>)> {
    let input = input.normalized()?;
    let member = TeamRepository::new(state.pool()).create(&input).await?;

    tracing::info!(team_member_id = %member.id, "Team member created");
    Ok((StatusCode::CREATED, Json(member)))
}

/// Partially update a team member.
#[instrument(skip_all, fields(team_member_id = %id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<TeamMemberId>,
    AppJson(patch): AppJson<TeamMemberPatch>,
) -> Result<Json<TeamMember>> {
    let repo = TeamRepository::new(state.pool());
    let current = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;

    let is_active = patch.is_active;
    let input = patch.apply(&current).normalized()?;
    Ok(Json(repo.update(id, &input, is_active).await?))
}

/// Flip a team member's visibility.
#[instrument(skip_all, fields(team_member_id = %id))]
pub async fn toggle_active(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<TeamMemberId>,
) -> Result<Json<TeamMember>> {
    let member = TeamRepository::new(state.pool()).toggle_active(id).await?;
    tracing::info!(is_active = member.is_active, "Team member visibility toggled");
    Ok(Json(member))
}

/// Rewrite the display order of several team members at once.
#[instrument(skip_all, fields(count = items.len()))]
pub async fn reorder(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppJson(items): AppJson<Vec<ReorderItem>>,
) -> Result<Json<ReorderResponse>> {
    reorder_rows(&state, OrderedTable::TeamMember, &items).await
}

/// Remove a team member.
#[instrument(skip_all, fields(team_member_id = %id))]
pub async fn delete(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<TeamMemberId>,
) -> Result<StatusCode> {
    TeamRepository::new(state.pool()).delete(id).await?;
    tracing::info!("Team member deleted");
    Ok(StatusCode::NO_CONTENT)
}
