//! Validation of tracker beacons.

use serde::Deserialize;

use super::AnalyticsError;
use crate::models::{NewPageView, Utm};

/// Maximum stored path length.
pub const MAX_PATH_LENGTH: usize = 2048;

/// Longest value kept for referrer, UTM fields and user agent.
pub const MAX_FIELD_LENGTH: usize = 512;

/// Longest time-on-page accepted (one day).
pub const MAX_DURATION_SECONDS: i64 = 86_400;

const SESSION_ID_LENGTH: std::ops::RangeInclusive<usize> = 8..=128;

/// Page view beacon sent by the public site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackRequest {
    pub session_id: String,
    pub path: String,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub utm_campaign: Option<String>,
    #[serde(default)]
    pub utm_term: Option<String>,
    #[serde(default)]
    pub utm_content: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
}

impl TrackRequest {
    /// Validate the beacon and turn it into a row to insert.
    ///
    /// The query string is stripped from `path`; UTM parameters found there
    /// fill in any UTM field the beacon left empty.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::InvalidSessionId` or
    /// `AnalyticsError::InvalidPath` for malformed input.
    pub fn into_page_view(self, user_agent: Option<&str>) -> Result<NewPageView, AnalyticsError> {
        let session_id = validate_session_id(&self.session_id)?;

        let raw_path = self.path.trim();
        if !raw_path.starts_with('/') || raw_path.chars().count() > MAX_PATH_LENGTH {
            return Err(AnalyticsError::InvalidPath(MAX_PATH_LENGTH));
        }
        let without_fragment = raw_path.split('#').next().unwrap_or(raw_path);
        let (path, query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));

        let from_query = utm_from_query(query);
        let utm = Utm {
            source: clean(self.utm_source).or(from_query.source),
            medium: clean(self.utm_medium).or(from_query.medium),
            campaign: clean(self.utm_campaign).or(from_query.campaign),
            term: clean(self.utm_term).or(from_query.term),
            content: clean(self.utm_content).or(from_query.content),
        };

        Ok(NewPageView {
            session_id,
            path: path.to_owned(),
            referrer: clean(self.referrer),
            utm,
            user_agent: clean(user_agent.map(str::to_owned)),
            duration_seconds: self.duration_seconds.map(clamp_duration),
        })
    }
}

/// Time-on-page beacon sent when the visitor leaves a page.
#[derive(Debug, Clone, Deserialize)]
pub struct DurationBeacon {
    pub id: i64,
    pub session_id: String,
    pub duration_seconds: i64,
}

impl DurationBeacon {
    /// Validated session id and clamped duration.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::InvalidSessionId` for a malformed session id.
    pub fn validated(&self) -> Result<(String, i32), AnalyticsError> {
        let session_id = validate_session_id(&self.session_id)?;
        Ok((session_id, clamp_duration(self.duration_seconds)))
    }
}

/// Clamp a reported duration into `0..=MAX_DURATION_SECONDS`.
#[must_use]
pub fn clamp_duration(seconds: i64) -> i32 {
    i32::try_from(seconds.clamp(0, MAX_DURATION_SECONDS)).unwrap_or(0)
}

fn validate_session_id(raw: &str) -> Result<String, AnalyticsError> {
    let id = raw.trim();
    let valid = SESSION_ID_LENGTH.contains(&id.len())
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(id.to_owned())
    } else {
        Err(AnalyticsError::InvalidSessionId)
    }
}

/// Trim, drop blanks, and cap at [`MAX_FIELD_LENGTH`] characters.
fn clean(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_FIELD_LENGTH).collect())
}

fn utm_from_query(query: &str) -> Utm {
    let mut utm = Utm::default();
    if query.is_empty() {
        return utm;
    }
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = clean(Some(value.into_owned()));
        match key.as_ref() {
            "utm_source" => utm.source = value,
            "utm_medium" => utm.medium = value,
            "utm_campaign" => utm.campaign = value,
            "utm_term" => utm.term = value,
            "utm_content" => utm.content = value,
            _ => {}
        }
    }
    utm
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(path: &str) -> TrackRequest {
        TrackRequest {
            session_id: "s_1234567890".to_owned(),
            path: path.to_owned(),
            ..TrackRequest::default()
        }
    }

    #[test]
    fn test_valid_beacon() {
        let mut req = request("/programs");
        req.referrer = Some("  https://google.com/  ".to_owned());
        req.utm_term = Some("   ".to_owned());
        let view = req.into_page_view(Some("Mozilla/5.0")).unwrap();
        assert_eq!(view.path, "/programs");
        assert_eq!(view.referrer.as_deref(), Some("https://google.com/"));
        assert_eq!(view.utm.term, None);
        assert_eq!(view.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_rejects_bad_session_ids() {
        for id in ["short", "has space in it", "semi;colon123", &"a".repeat(129)] {
            let mut req = request("/");
            req.session_id = id.to_owned();
            assert_eq!(
                req.into_page_view(None).unwrap_err(),
                AnalyticsError::InvalidSessionId,
                "{id}"
            );
        }
    }

    #[test]
    fn test_rejects_bad_paths() {
        assert!(request("programs").into_page_view(None).is_err());
        assert!(request("https://evil.test/").into_page_view(None).is_err());
        let long = format!("/{}", "a".repeat(MAX_PATH_LENGTH));
        assert!(request(&long).into_page_view(None).is_err());
    }

    #[test]
    fn test_utm_extracted_from_query_string() {
        let mut req = request("/blog/launch?utm_source=linkedin&utm_medium=social&ref=x#top");
        req.utm_medium = Some("paid".to_owned());
        let view = req.into_page_view(None).unwrap();
        assert_eq!(view.path, "/blog/launch");
        assert_eq!(view.utm.source.as_deref(), Some("linkedin"));
        assert_eq!(view.utm.medium.as_deref(), Some("paid"));
        assert_eq!(view.utm.campaign, None);
    }

    #[test]
    fn test_long_fields_truncated() {
        let mut req = request("/");
        req.utm_campaign = Some("c".repeat(1000));
        let view = req.into_page_view(None).unwrap();
        assert_eq!(view.utm.campaign.unwrap().len(), MAX_FIELD_LENGTH);
    }

    #[test]
    fn test_duration_clamped() {
        assert_eq!(clamp_duration(-5), 0);
        assert_eq!(clamp_duration(42), 42);
        assert_eq!(clamp_duration(1_000_000), 86_400);

        let beacon = DurationBeacon {
            id: 1,
            session_id: "abcdefgh".to_owned(),
            duration_seconds: 90_000,
        };
        assert_eq!(beacon.validated().unwrap(), ("abcdefgh".to_owned(), 86_400));
    }
}
