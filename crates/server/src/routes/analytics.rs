//! First-party analytics: tracking beacons and reports.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use academy_core::PageViewId;

use crate::db::PageViewRepository;
use crate::error::Result;
use crate::extract::{AppJson, AppQuery};
use crate::middleware::{RequireAuth, api_rate_limiter};
use crate::services::analytics::{
    self, AnalyticsRange, Bucket, CampaignParams, DurationBeacon, Overview, Realtime, SourceStat,
    TrackRequest, TrendPoint, TrendWindow,
};
use crate::state::AppState;

/// Build the `/api/analytics` router.
///
/// The two beacon endpoints are public and rate limited; reports need a token.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/track", post(track))
        .route("/duration", post(duration))
        .layer(api_rate_limiter())
        .route("/overview", get(overview))
        .route("/trends", get(trends))
        .route("/sources", get(sources))
        .route("/realtime", get(realtime))
        .route("/campaign-link", post(campaign_link))
}

// =============================================================================
// Query / Response Types
// =============================================================================

/// Report query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub range: Option<String>,
    pub bucket: Option<String>,
}

/// ID of a recorded page view, used later by the duration beacon.
#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub id: PageViewId,
}

/// Result of a duration beacon.
#[derive(Debug, Serialize)]
pub struct DurationResponse {
    /// False when the view is unknown or already has a duration.
    pub updated: bool,
}

/// Trend series for a chart.
#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub range: AnalyticsRange,
    pub bucket: Bucket,
    pub points: Vec<TrendPoint>,
}

/// Attribution table for a window.
#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub range: AnalyticsRange,
    pub sources: Vec<SourceStat>,
}

/// A tagged campaign URL.
#[derive(Debug, Serialize)]
pub struct CampaignLinkResponse {
    pub url: String,
}

// =============================================================================
// Beacons
// =============================================================================

/// Record a page view.
#[instrument(skip_all)]
pub async fn track(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(body): AppJson<TrackRequest>,
) -> Result<(StatusCode, Json<TrackResponse>)> {
    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
    let view = body.into_page_view(user_agent)?;

    let id = PageViewRepository::new(state.pool()).insert(&view).await?;
    tracing::debug!(page_view_id = %id, path = %view.path, "Page view recorded");
    Ok((StatusCode::CREATED, Json(TrackResponse { id })))
}

/// Attach time-on-page to a recorded view.
#[instrument(skip_all, fields(page_view_id = body.id))]
pub async fn duration(
    State(state): State<AppState>,
    AppJson(body): AppJson<DurationBeacon>,
) -> Result<Json<DurationResponse>> {
    let (session_id, seconds) = body.validated()?;
    let updated = PageViewRepository::new(state.pool())
        .set_duration(PageViewId::new(body.id), &session_id, seconds)
        .await?;
    Ok(Json(DurationResponse { updated }))
}

// =============================================================================
// Reports
// =============================================================================

/// Headline numbers for a range.
#[instrument(skip(state, _user))]
pub async fn overview(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ReportQuery>,
) -> Result<Json<Overview>> {
    let range = AnalyticsRange::parse_or_default(query.range.as_deref())?;
    let now = Utc::now();
    let views = PageViewRepository::new(state.pool())
        .list_between(range.start(now), now)
        .await?;
    Ok(Json(analytics::overview(
        range,
        &views,
        &state.config().site_hosts(),
    )))
}

/// Views and sessions per hour or day, zero-filled.
#[instrument(skip(state, _user))]
pub async fn trends(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ReportQuery>,
) -> Result<Json<TrendsResponse>> {
    let range = AnalyticsRange::parse_or_default(query.range.as_deref())?;
    let bucket = match query.bucket.as_deref().map(str::trim) {
        None | Some("") => range.default_bucket(),
        Some(raw) => raw.parse()?,
    };

    let now = Utc::now();
    let window = TrendWindow::new(range, bucket, now);
    let views = PageViewRepository::new(state.pool())
        .list_between(window.start, now)
        .await?;

    Ok(Json(TrendsResponse {
        range,
        bucket,
        points: analytics::trends(&window, &views),
    }))
}

/// Sessions by first-touch source, medium and campaign.
#[instrument(skip(state, _user))]
pub async fn sources(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ReportQuery>,
) -> Result<Json<SourcesResponse>> {
    let range = AnalyticsRange::parse_or_default(query.range.as_deref())?;
    let now = Utc::now();
    let views = PageViewRepository::new(state.pool())
        .list_between(range.start(now), now)
        .await?;
    Ok(Json(SourcesResponse {
        range,
        sources: analytics::attribution(&views, &state.config().site_hosts()),
    }))
}

/// Visitors active in the last few minutes.
#[instrument(skip_all)]
pub async fn realtime(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Realtime>> {
    let now = Utc::now();
    let cutoff = Realtime::cutoff(now);
    let repo = PageViewRepository::new(state.pool());

    let active = repo.active_sessions_since(cutoff).await?;
    let pages = repo.active_pages_since(cutoff).await?;
    Ok(Json(Realtime::new(active, pages, now)))
}

/// Build a UTM-tagged link for a campaign.
#[instrument(skip_all)]
pub async fn campaign_link(
    RequireAuth(_user): RequireAuth,
    AppJson(params): AppJson<CampaignParams>,
) -> Result<Json<CampaignLinkResponse>> {
    let url = analytics::build_campaign_url(&params)?;
    Ok(Json(CampaignLinkResponse { url }))
}
