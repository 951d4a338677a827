//! Blog and news post handlers.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use academy_core::{PostId, PostStatus, PostType, Slug};

use crate::db::PostRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Post, PostFilter, PostInput, PostPatch};
use crate::services::content::{derive_excerpt, reading_time_minutes, render_markdown};
use crate::state::AppState;

/// Default page size for post listings.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: i64 = 100;

/// Length of excerpts derived from the post body.
const DERIVED_EXCERPT_CHARS: usize = 200;

/// Build the `/api/posts` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/id/{id}", get(get_by_id))
        .route("/{post}", get(show).put(update).delete(delete))
        .route("/{post}/status", patch(set_status))
}

// =============================================================================
// Query / Response Types
// =============================================================================

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub post_type: Option<PostType>,
    /// `draft`, `published` or `all`; honored for staff only.
    pub status: Option<String>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// A post as returned by the API.
#[derive(Debug, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub reading_time_minutes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_html: Option<String>,
}

impl PostView {
    /// Listing shape: excerpt filled in, no rendered body.
    #[must_use]
    pub fn summary(mut post: Post) -> Self {
        if post.excerpt.is_none() {
            post.excerpt = Some(derive_excerpt(&post.content, DERIVED_EXCERPT_CHARS));
        }
        Self {
            reading_time_minutes: reading_time_minutes(&post.content),
            post,
            content_html: None,
        }
    }

    /// Detail shape: summary plus rendered HTML.
    #[must_use]
    pub fn detail(post: Post) -> Self {
        let content_html = render_markdown(&post.content);
        Self {
            content_html: Some(content_html),
            ..Self::summary(post)
        }
    }
}

/// One page of posts.
#[derive(Debug, Serialize)]
pub struct PostPage {
    pub items: Vec<PostView>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Status change body; an absent status toggles.
#[derive(Debug, Default, Deserialize)]
pub struct StatusRequest {
    pub status: Option<PostStatus>,
}

/// Resolve the status filter for a caller.
///
/// Anonymous callers only ever see published posts.
fn status_filter(raw: Option<&str>, is_staff: bool) -> Result<Option<PostStatus>> {
    if !is_staff {
        return Ok(Some(PostStatus::Published));
    }
    match raw.map(str::trim) {
        None | Some("") => Ok(Some(PostStatus::Published)),
        Some("all") => Ok(None),
        Some(other) => other
            .parse()
            .map(Some)
            .map_err(|e: academy_core::ParseEnumError| AppError::BadRequest(e.to_string())),
    }
}

/// Clamp pagination parameters to `(page, per_page)`.
fn pagination(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    (page, per_page)
}

// =============================================================================
// Handlers
// =============================================================================

/// List posts, newest first.
#[instrument(skip(state, caller))]
pub async fn list(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<PostPage>> {
    let (page, per_page) = pagination(query.page, query.per_page);
    let filter = PostFilter {
        post_type: query.post_type,
        status: status_filter(query.status.as_deref(), caller.is_some())?,
        search: query
            .q
            .map(|q| q.trim().to_owned())
            .filter(|q| !q.is_empty()),
        limit: per_page,
        offset: (page - 1).saturating_mul(per_page),
    };

    let repo = PostRepository::new(state.pool());
    let total = repo.count(&filter).await?;
    let items = repo
        .list(&filter)
        .await?
        .into_iter()
        .map(PostView::summary)
        .collect();

    Ok(Json(PostPage {
        items,
        total,
        page,
        per_page,
    }))
}

/// Show a post by slug.
///
/// Drafts are visible to staff only. Anonymous reads count as a view.
#[instrument(skip(state, caller))]
pub async fn show(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> Result<Json<PostView>> {
    let not_found = || AppError::NotFound(format!("post {slug}"));
    let parsed = Slug::parse(&slug).map_err(|_| not_found())?;

    let repo = PostRepository::new(state.pool());
    let mut post = repo.get_by_slug(&parsed).await?.ok_or_else(not_found)?;

    if caller.is_none() {
        if !post.status.is_public() {
            return Err(not_found());
        }
        repo.increment_views(post.id).await?;
        post.views += 1;
    }

    Ok(Json(PostView::detail(post)))
}

/// Fetch any post by ID for the editor.
#[instrument(skip(state, _user))]
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<PostId>,
) -> Result<Json<PostView>> {
    PostRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(|post| Json(PostView::detail(post)))
        .ok_or_else(|| AppError::NotFound(format!("post {id}")))
}

/// Create a post. The slug is derived from the title when omitted.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppJson(input): AppJson<PostInput>,
) -> Result<(StatusCode, Json<PostView>)> {
    let input = input.normalized()?;
    let post = PostRepository::new(state.pool())
        .create(&input, input.slug()?, Some(user.id))
        .await?;

    tracing::info!(post_id = %post.id, slug = %post.slug, "Post created");
    add_breadcrumb("content", "Post created", Some(&[("slug", post.slug.as_str())]));
    Ok((StatusCode::CREATED, Json(PostView::detail(post))))
}

/// Partially update a post.
#[instrument(skip_all, fields(post_id = %id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<PostId>,
    AppJson(patch): AppJson<PostPatch>,
) -> Result<Json<PostView>> {
    let repo = PostRepository::new(state.pool());
    let current = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {id}")))?;

    let status = patch.status;
    let input = patch.apply(&current).normalized()?;
    let post = repo.update(id, &input, input.slug()?, status).await?;

    tracing::info!("Post updated");
    Ok(Json(PostView::detail(post)))
}

/// Publish or unpublish a post. An empty body toggles the current status.
#[instrument(skip_all, fields(post_id = %id))]
pub async fn set_status(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<PostId>,
    body: Bytes,
) -> Result<Json<PostView>> {
    let request: StatusRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StatusRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    let repo = PostRepository::new(state.pool());
    let status = match request.status {
        Some(status) => status,
        None => repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {id}")))?
            .status
            .toggled(),
    };

    let post = repo.set_status(id, status).await?;
    tracing::info!(status = %post.status, "Post status changed");
    Ok(Json(PostView::summary(post)))
}

/// Delete a post.
#[instrument(skip_all, fields(post_id = %id))]
pub async fn delete(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<PostId>,
) -> Result<StatusCode> {
    PostRepository::new(state.pool()).delete(id).await?;
    tracing::info!("Post deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(content: &str, excerpt: Option<&str>) -> Post {
        let now = Utc::now();
        Post {
            id: PostId::new(7),
            title: "Agents in practice".to_string(),
            slug: Slug::parse("agents-in-practice").unwrap(),
            content: content.to_string(),
            excerpt: excerpt.map(String::from),
            cover_image: None,
            post_type: PostType::Blog,
            status: PostStatus::Published,
            published_at: Some(now),
            author_id: None,
            author_name: None,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_filter() {
        assert_eq!(
            status_filter(Some("all"), false).unwrap(),
            Some(PostStatus::Published)
        );
        assert_eq!(status_filter(Some("all"), true).unwrap(), None);
        assert_eq!(
            status_filter(Some("draft"), true).unwrap(),
            Some(PostStatus::Draft)
        );
        assert_eq!(
            status_filter(None, true).unwrap(),
            Some(PostStatus::Published)
        );
        assert!(status_filter(Some("archived"), true).is_err());
    }

    #[test]
    fn test_pagination_clamps() {
        assert_eq!(pagination(None, None), (1, DEFAULT_PER_PAGE));
        assert_eq!(pagination(Some(0), Some(1000)), (1, MAX_PER_PAGE));
        assert_eq!(pagination(Some(3), Some(0)), (3, 1));
    }

    #[test]
    fn test_summary_derives_missing_excerpt() {
        let view = PostView::summary(post("Large language models **change** teaching.", None));
        assert_eq!(
            view.post.excerpt.as_deref(),
            Some("Large language models change teaching.")
        );
        assert_eq!(view.reading_time_minutes, 1);
        assert!(view.content_html.is_none());

        let view = PostView::summary(post("Body", Some("Hand-written")));
        assert_eq!(view.post.excerpt.as_deref(), Some("Hand-written"));
    }

    #[test]
    fn test_detail_serializes_flat() {
        let json = serde_json::to_value(PostView::detail(post("# Hi", None))).unwrap();
        assert_eq!(json["slug"], "agents-in-practice");
        assert_eq!(json["type"], "blog");
        assert!(json["content_html"].as_str().unwrap().contains("<h1"));
    }
}
