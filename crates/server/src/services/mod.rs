//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password login, staff registration, bearer tokens
//! - `analytics` - Session reconstruction, attribution, trends
//! - `content` - Markdown rendering, excerpts, reading time
//! - `translations` - Locale dictionaries with default-locale fallback
//! - `uploads` - Image validation and storage

pub mod analytics;
pub mod auth;
pub mod content;
pub mod translations;
pub mod uploads;
