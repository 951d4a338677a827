//! UTM-tagged campaign link builder.

use serde::Deserialize;
use url::Url;

use super::AnalyticsError;

/// Parameters for a campaign link.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignParams {
    pub url: String,
    pub source: String,
    pub medium: String,
    pub campaign: String,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Append UTM parameters to a landing URL.
///
/// Existing `utm_*` parameters are replaced; other query parameters and the
/// fragment are preserved.
///
/// # Errors
///
/// Returns `AnalyticsError::InvalidUrl` if the base is not an absolute
/// http(s) URL, or `AnalyticsError::MissingField` if source, medium or
/// campaign is blank.
pub fn build_campaign_url(params: &CampaignParams) -> Result<String, AnalyticsError> {
    let mut url = Url::parse(params.url.trim())
        .map_err(|e| AnalyticsError::InvalidUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AnalyticsError::InvalidUrl(
            "only http and https links can be tagged".to_owned(),
        ));
    }

    let source = required("source", &params.source)?;
    let medium = required("medium", &params.medium)?;
    let campaign = required("campaign", &params.campaign)?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !key.starts_with("utm_"))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (key, value) in &kept {
            query.append_pair(key, value);
        }
        query
            .append_pair("utm_source", source)
            .append_pair("utm_medium", medium)
            .append_pair("utm_campaign", campaign);
        if let Some(term) = optional(params.term.as_deref()) {
            query.append_pair("utm_term", term);
        }
        if let Some(content) = optional(params.content.as_deref()) {
            query.append_pair("utm_content", content);
        }
    }

    Ok(url.into())
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, AnalyticsError> {
    let value = value.trim();
    if value.is_empty() {
        Err(AnalyticsError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(url: &str) -> CampaignParams {
        CampaignParams {
            url: url.to_owned(),
            source: " linkedin ".to_owned(),
            medium: "social".to_owned(),
            campaign: "spring launch".to_owned(),
            term: None,
            content: Some(String::new()),
        }
    }

    #[test]
    fn test_appends_utm_params() {
        let link = build_campaign_url(&params("https://academy.io/programs")).unwrap();
        assert_eq!(
            link,
            "https://academy.io/programs?utm_source=linkedin&utm_medium=social&utm_campaign=spring+launch"
        );
    }

    #[test]
    fn test_replaces_existing_utm_and_keeps_others() {
        let link =
            build_campaign_url(&params("https://academy.io/?ref=abc&utm_source=old#pricing"))
                .unwrap();
        assert_eq!(
            link,
            "https://academy.io/?ref=abc&utm_source=linkedin&utm_medium=social&utm_campaign=spring+launch#pricing"
        );
    }

    #[test]
    fn test_optional_fields() {
        let mut p = params("https://academy.io/");
        p.term = Some("ai course".to_owned());
        p.content = Some("banner".to_owned());
        let link = build_campaign_url(&p).unwrap();
        assert!(link.ends_with("&utm_term=ai+course&utm_content=banner"));
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(matches!(
            build_campaign_url(&params("/relative")),
            Err(AnalyticsError::InvalidUrl(_))
        ));
        assert!(matches!(
            build_campaign_url(&params("ftp://academy.io/")),
            Err(AnalyticsError::InvalidUrl(_))
        ));
        let mut p = params("https://academy.io/");
        p.campaign = "  ".to_owned();
        assert_eq!(
            build_campaign_url(&p),
            Err(AnalyticsError::MissingField("campaign"))
        );
    }
}
