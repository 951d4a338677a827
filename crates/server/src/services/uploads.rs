//! Image uploads for covers, photos and portfolio shots.
//!
//! The file type is identified from the leading bytes; the client-declared
//! content type and file name are ignored. Files are stored under a random
//! name so uploads can never overwrite each other or escape the directory.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::UploadConfig;

/// Errors that can occur while accepting an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file was uploaded")]
    Empty,

    #[error("file exceeds the {max} byte limit")]
    TooLarge { max: usize },

    #[error("unsupported image type (allowed: JPEG, PNG, GIF, WebP)")]
    UnsupportedType,

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    /// Identify an image by its magic bytes.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    /// File extension used when storing.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    /// MIME type.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

/// A stored upload, as returned to the admin panel.
#[derive(Debug, Clone, Serialize)]
pub struct StoredUpload {
    /// Public URL path of the file.
    pub url: String,
    pub filename: String,
    pub size: usize,
    pub content_type: &'static str,
}

/// Check size and type without touching the disk.
///
/// # Errors
///
/// Returns `UploadError::Empty`, `UploadError::TooLarge` or
/// `UploadError::UnsupportedType`.
pub fn inspect(bytes: &[u8], max_bytes: usize) -> Result<ImageKind, UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(UploadError::TooLarge { max: max_bytes });
    }
    ImageKind::detect(bytes).ok_or(UploadError::UnsupportedType)
}

/// Validate and write an image into the upload directory.
///
/// # Errors
///
/// Returns a validation error from [`inspect`], or `UploadError::Io` if the
/// directory cannot be created or the file cannot be written.
pub async fn store_image(config: &UploadConfig, bytes: &[u8]) -> Result<StoredUpload, UploadError> {
    let kind = inspect(bytes, config.max_bytes)?;

    tokio::fs::create_dir_all(&config.dir).await?;

    let filename = format!("{}.{}", Uuid::new_v4(), kind.extension());
    tokio::fs::write(config.dir.join(&filename), bytes).await?;

    Ok(StoredUpload {
        url: format!("{}/{filename}", config.public_path.trim_end_matches('/')),
        filename,
        size: bytes.len(),
        content_type: kind.content_type(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn test_detects_supported_types() {
        assert_eq!(ImageKind::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::detect(PNG), Some(ImageKind::Png));
        assert_eq!(ImageKind::detect(b"GIF89a...."), Some(ImageKind::Gif));
        assert_eq!(ImageKind::detect(b"RIFF\x24\0\0\0WEBPVP8 "), Some(ImageKind::Webp));
        assert_eq!(ImageKind::detect(b"RIFF\x24\0\0\0WAVEfmt "), None);
        assert_eq!(ImageKind::detect(b"<svg xmlns="), None);
        assert_eq!(ImageKind::detect(&[0xFF]), None);
    }

    #[test]
    fn test_inspect_limits() {
        assert!(matches!(inspect(&[], 10), Err(UploadError::Empty)));
        assert!(matches!(
            inspect(PNG, 4),
            Err(UploadError::TooLarge { max: 4 })
        ));
        assert!(matches!(
            inspect(b"%PDF-1.7", 100),
            Err(UploadError::UnsupportedType)
        ));
        assert_eq!(inspect(PNG, 100).unwrap(), ImageKind::Png);
    }

    #[tokio::test]
    async fn test_store_image_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = UploadConfig {
            dir: dir.path().join("nested"),
            public_path: "/uploads/".to_string(),
            max_bytes: 1024,
        };

        let stored = store_image(&config, PNG).await.unwrap();
        assert!(stored.filename.ends_with(".png"));
        assert_eq!(stored.url, format!("/uploads/{}", stored.filename));
        assert_eq!(stored.size, PNG.len());

        let written = std::fs::read(config.dir.join(&stored.filename)).unwrap();
        assert_eq!(written, PNG);
    }
}
