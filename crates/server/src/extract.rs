//! Request extractors whose rejections render as [`AppError`] JSON.
//!
//! axum's own `Json`, `Path` and `Query` reject with `text/plain` bodies and
//! a mix of 400/415/422 statuses. Handlers use these wrappers instead so a
//! bad body or parameter comes back as `{"error": ...}` with status 400.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters.
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
