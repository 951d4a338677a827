//! Image upload handler.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::uploads::{StoredUpload, UploadError, store_image};
use crate::state::AppState;

/// Multipart field carrying the file.
const IMAGE_FIELD: &str = "image";

/// Build the `/api/upload` router.
pub fn router() -> Router<AppState> {
    Router::new().route("/image", post(upload_image))
}

/// Accept one image from the `image` multipart field.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn upload_image(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StoredUpload>)> {
    let limit = state.config().uploads.max_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, limit))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let bytes = field.bytes().await.map_err(|e| multipart_error(&e, limit))?;
        let stored = store_image(&state.config().uploads, &bytes).await?;

        tracing::info!(
            filename = %stored.filename,
            size = stored.size,
            content_type = stored.content_type,
            "Image uploaded"
        );
        return Ok((StatusCode::CREATED, Json(stored)));
    }

    Err(UploadError::Empty.into())
}

/// Map a multipart read failure, keeping the body-limit case distinct.
fn multipart_error(err: &axum::extract::multipart::MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { max: limit }.into()
    } else {
        AppError::BadRequest(err.body_text())
    }
}
