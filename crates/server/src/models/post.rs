//! Blog and news posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use academy_core::{PostId, PostStatus, PostType, Slug, UserId};

use super::{MAX_TITLE_LENGTH, ValidationError, clean_optional, merge_nullable, require_text};

/// Maximum excerpt length in characters.
pub const MAX_EXCERPT_LENGTH: usize = 500;

/// A post (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: Slug,
    /// Markdown source.
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Option<UserId>,
    pub author_name: Option<String>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every editable field of a post.
///
/// `slug` is optional on create; the repository caller derives it from the
/// title when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct PostInput {
    pub title: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(rename = "type", default)]
    pub post_type: PostType,
    #[serde(default)]
    pub status: PostStatus,
}

impl PostInput {
    /// Validate and normalize the input.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank or oversized title, an
    /// oversized excerpt, or a title from which no slug can be derived.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        require_text("title", &self.title, MAX_TITLE_LENGTH)?;
        self.title = self.title.trim().to_owned();
        self.excerpt = clean_optional(self.excerpt);
        self.cover_image = clean_optional(self.cover_image);

        if let Some(excerpt) = &self.excerpt
            && excerpt.chars().count() > MAX_EXCERPT_LENGTH
        {
            return Err(ValidationError::new(
                "excerpt",
                format!("must be at most {MAX_EXCERPT_LENGTH} characters"),
            ));
        }

        if self.slug.is_none() {
            let slug = Slug::from_title(&self.title)
                .map_err(|e| ValidationError::new("slug", e.to_string()))?;
            self.slug = Some(slug);
        }

        Ok(self)
    }

    /// The slug, which is always present after [`Self::normalized`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if called on un-normalized input without a slug.
    pub fn slug(&self) -> Result<&Slug, ValidationError> {
        self.slug
            .as_ref()
            .ok_or_else(|| ValidationError::new("slug", "is required"))
    }
}

/// Partial update for a post. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    #[serde(rename = "type")]
    pub post_type: Option<PostType>,
    pub status: Option<PostStatus>,
}

impl PostPatch {
    /// Apply this patch on top of the current post.
    #[must_use]
    pub fn apply(self, current: &Post) -> PostInput {
        PostInput {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            slug: Some(self.slug.unwrap_or_else(|| current.slug.clone())),
            content: self.content.unwrap_or_else(|| current.content.clone()),
            excerpt: merge_nullable(self.excerpt, current.excerpt.as_ref()),
            cover_image: merge_nullable(self.cover_image, current.cover_image.as_ref()),
            post_type: self.post_type.unwrap_or(current.post_type),
            status: self.status.unwrap_or(current.status),
        }
    }
}

/// Filters for listing posts.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Restrict to one post type.
    pub post_type: Option<PostType>,
    /// Restrict to one status; `None` lists every status.
    pub status: Option<PostStatus>,
    /// Case-insensitive match on title or excerpt.
    pub search: Option<String>,
    /// Page size.
    pub limit: i64,
    /// Rows to skip.
    pub offset: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        let now = Utc::now();
        Post {
            id: PostId::new(1),
            title: "Original".to_string(),
            slug: Slug::parse("original").unwrap(),
            content: "# Body".to_string(),
            excerpt: Some("Short".to_string()),
            cover_image: None,
            post_type: PostType::News,
            status: PostStatus::Published,
            published_at: Some(now),
            author_id: Some(UserId::new(3)),
            author_name: Some("Ada".to_string()),
            views: 12,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_normalized_derives_slug_from_title() {
        let input: PostInput =
            serde_json::from_str(r#"{"title": "  What is RAG? A Primer "}"#).unwrap();
        let input = input.normalized().unwrap();
        assert_eq!(input.title, "What is RAG? A Primer");
        assert_eq!(input.slug().unwrap().as_str(), "what-is-rag-a-primer");
        assert_eq!(input.post_type, PostType::Blog);
        assert_eq!(input.status, PostStatus::Draft);
    }

    #[test]
    fn test_normalized_rejects_blank_title() {
        let input: PostInput = serde_json::from_str(r#"{"title": "   "}"#).unwrap();
        assert_eq!(input.normalized().unwrap_err().field, "title");
    }

    #[test]
    fn test_invalid_slug_rejected_at_deserialize() {
        let result: Result<PostInput, _> =
            serde_json::from_str(r#"{"title": "T", "slug": "Not A Slug"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_keeps_unspecified_fields() {
        let post = sample_post();
        let patch = PostPatch {
            status: Some(PostStatus::Draft),
            ..PostPatch::default()
        };
        let merged = patch.apply(&post);
        assert_eq!(merged.status, PostStatus::Draft);
        assert_eq!(merged.title, post.title);
        assert_eq!(merged.slug.as_ref(), Some(&post.slug));
        assert_eq!(merged.content, post.content);
        assert_eq!(merged.excerpt, post.excerpt);
        assert_eq!(merged.post_type, post.post_type);
    }

    #[test]
    fn test_patch_blank_excerpt_clears() {
        let post = sample_post();
        let patch = PostPatch {
            excerpt: Some(String::new()),
            ..PostPatch::default()
        };
        assert_eq!(patch.apply(&post).excerpt, None);
    }

    #[test]
    fn test_content_patch_does_not_carry_status() {
        let patch: PostPatch =
            serde_json::from_str(r#"{"title": "Renamed", "content": "New body"}"#).unwrap();
        assert_eq!(patch.status, None);

        let merged = patch.apply(&sample_post());
        assert_eq!(merged.title, "Renamed");
        assert_eq!(merged.slug.unwrap().as_str(), "original");
        assert_eq!(merged.excerpt.as_deref(), Some("Short"));
    }
}
