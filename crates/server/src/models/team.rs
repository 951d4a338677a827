//! Team page profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use academy_core::TeamMemberId;

use super::{MAX_TITLE_LENGTH, ValidationError, clean_optional, merge_nullable, require_text};

/// A team member (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct TeamMember {
    pub id: TeamMemberId,
    pub name: String,
    pub position: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub github_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every editable field of a team member.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamMemberInput {
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl TeamMemberInput {
    /// Validate and normalize.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name, an invalid contact
    /// email, or a social link that is not an http(s) URL.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        require_text("name", &self.name, MAX_TITLE_LENGTH)?;
        self.name = self.name.trim().to_owned();
        self.position = self.position.trim().to_owned();
        self.bio = clean_optional(self.bio);
        self.photo_url = clean_optional(self.photo_url);

        self.email = match clean_optional(self.email) {
            Some(raw) => Some(
                academy_core::Email::parse(&raw)
                    .map_err(|e| ValidationError::new("email", e.to_string()))?
                    .into_inner(),
            ),
            None => None,
        };

        self.linkedin_url = check_link("linkedin_url", clean_optional(self.linkedin_url))?;
        self.twitter_url = check_link("twitter_url", clean_optional(self.twitter_url))?;
        self.github_url = check_link("github_url", clean_optional(self.github_url))?;
        Ok(self)
    }
}

/// Social links must be absolute http(s) URLs.
fn check_link(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, ValidationError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    match url::Url::parse(&raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(Some(raw)),
        _ => Err(ValidationError::new(field, "must be an http(s) URL")),
    }
}

/// Partial update for a team member.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamMemberPatch {
    pub name: Option<String>,
    pub position: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub github_url: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl TeamMemberPatch {
    /// Apply this patch on top of the current team member.
    #[must_use]
    pub fn apply(self, current: &TeamMember) -> TeamMemberInput {
        TeamMemberInput {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            position: self.position.unwrap_or_else(|| current.position.clone()),
            bio: merge_nullable(self.bio, current.bio.as_ref()),
            photo_url: merge_nullable(self.photo_url, current.photo_url.as_ref()),
            email: merge_nullable(self.email, current.email.as_ref()),
            linkedin_url: merge_nullable(self.linkedin_url, current.linkedin_url.as_ref()),
            twitter_url: merge_nullable(self.twitter_url, current.twitter_url.as_ref()),
            github_url: merge_nullable(self.github_url, current.github_url.as_ref()),
            display_order: self.display_order.unwrap_or(current.display_order),
            is_active: self.is_active.unwrap_or(current.is_active),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(json: &str) -> TeamMemberInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_normalizes_contact_fields() {
        let member = input(
            r#"{"name": " Grace ", "email": "Grace@Academy.io",
                "github_url": "https://github.com/grace", "twitter_url": ""}"#,
        )
        .normalized()
        .unwrap();
        assert_eq!(member.name, "Grace");
        assert_eq!(member.email.as_deref(), Some("grace@academy.io"));
        assert_eq!(member.twitter_url, None);
    }

    #[test]
    fn test_rejects_non_http_links() {
        let err = input(r#"{"name": "Grace", "linkedin_url": "javascript:alert(1)"}"#)
            .normalized()
            .unwrap_err();
        assert_eq!(err.field, "linkedin_url");
    }
}
