//! Translation dictionary handlers.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::db::TranslationRepository;
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::RequireAuth;
use crate::services::translations::{
    Dictionary, TranslationError, nest, validate_entries, validate_key,
};
use crate::state::AppState;

/// Build the `/api/translations` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locales))
        .route("/{locale}", get(show).put(upsert))
        .route("/{locale}/{key}", delete(remove))
}

/// A configured locale and how many keys it defines itself.
#[derive(Debug, Serialize)]
pub struct LocaleInfo {
    pub code: String,
    pub entries: i64,
    pub is_default: bool,
}

/// Available locales.
#[derive(Debug, Serialize)]
pub struct LocalesResponse {
    pub default_locale: String,
    pub locales: Vec<LocaleInfo>,
}

/// Dictionary query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DictionaryQuery {
    /// Expand dotted keys into nested objects.
    #[serde(default)]
    pub nested: bool,
}

/// Result of a bulk write.
#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    pub locale: String,
    pub written: u64,
}

/// Normalize a locale from the path and check it is configured.
fn supported_locale(state: &AppState, raw: &str) -> std::result::Result<String, TranslationError> {
    let locale = raw.trim().to_lowercase();
    if state.config().i18n.supports(&locale) {
        Ok(locale)
    } else {
        Err(TranslationError::UnknownLocale(locale))
    }
}

/// List configured locales with their entry counts.
#[instrument(skip_all)]
pub async fn list_locales(State(state): State<AppState>) -> Result<Json<LocalesResponse>> {
    let counts: HashMap<String, i64> = TranslationRepository::new(state.pool())
        .locales()
        .await?
        .into_iter()
        .collect();

    let i18n = &state.config().i18n;
    let locales = i18n
        .locales
        .iter()
        .map(|code| LocaleInfo {
            code: code.clone(),
            entries: counts.get(code).copied().unwrap_or(0),
            is_default: *code == i18n.default_locale,
        })
        .collect();

    Ok(Json(LocalesResponse {
        default_locale: i18n.default_locale.clone(),
        locales,
    }))
}

/// The dictionary for a locale, with default-locale fallback applied.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    AppPath(locale): AppPath<String>,
    AppQuery(query): AppQuery<DictionaryQuery>,
) -> Result<Json<Value>> {
    let locale = supported_locale(&state, &locale)?;
    let dictionary = state
        .translations()
        .merged(state.pool(), &state.config().i18n, &locale)
        .await?;

    let body = if query.nested {
        nest(&dictionary)
    } else {
        serde_json::to_value(dictionary.as_ref())
            .map_err(|e| AppError::Internal(e.to_string()))?
    };
    Ok(Json(body))
}

/// Insert or overwrite entries for a locale.
#[instrument(skip_all, fields(locale = %locale, count = entries.len()))]
pub async fn upsert(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath(locale): AppPath<String>,
    AppJson(entries): AppJson<Dictionary>,
) -> Result<Json<UpsertResponse>> {
    let locale = supported_locale(&state, &locale)?;
    validate_entries(&entries)?;

    let written = TranslationRepository::new(state.pool())
        .upsert(&locale, &entries)
        .await?;
    state
        .translations()
        .invalidate(&state.config().i18n, &locale)
        .await;

    tracing::info!(written, "Translations updated");
    Ok(Json(UpsertResponse { locale, written }))
}

/// Remove one key from a locale.
#[instrument(skip_all, fields(locale = %locale, key = %key))]
pub async fn remove(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    AppPath((locale, key)): AppPath<(String, String)>,
) -> Result<StatusCode> {
    let locale = supported_locale(&state, &locale)?;
    validate_key(&key)?;

    TranslationRepository::new(state.pool())
        .delete(&locale, &key)
        .await?;
    state
        .translations()
        .invalidate(&state.config().i18n, &locale)
        .await;

    tracing::info!("Translation removed");
    Ok(StatusCode::NO_CONTENT)
}
