//! First-party analytics aggregation.
//!
//! Page views are stored raw; every report is computed here from the rows of
//! a time window. Nothing in this module touches the database, so the
//! aggregation rules are unit-testable with hand-built rows.
//!
//! # Sessions
//!
//! Views are grouped by `session_id`. A session's first view decides its
//! landing page and its traffic source (first-touch attribution). Referrers
//! on one of the site's own hosts count as direct traffic.

mod campaign;
mod tracking;

pub use campaign::{CampaignParams, build_campaign_url};
pub use tracking::{DurationBeacon, TrackRequest, clamp_duration};

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::PageView;

/// How many rows the top-N lists return.
pub const TOP_N: usize = 10;

/// Window used by the realtime report.
pub const REALTIME_WINDOW_MINUTES: i64 = 5;

/// Source label for sessions without referrer or campaign.
pub const DIRECT_SOURCE: &str = "(direct)";

/// Medium label when none applies.
pub const NO_MEDIUM: &str = "(none)";

/// Errors raised while validating analytics input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("session_id must be 8-128 characters of letters, digits, '-' or '_'")]
    InvalidSessionId,

    #[error("path must start with '/' and be at most {0} characters")]
    InvalidPath(usize),

    #[error("unknown range '{0}' (expected 24h, 7d, 30d or 90d)")]
    InvalidRange(String),

    #[error("unknown bucket '{0}' (expected hour or day)")]
    InvalidBucket(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("{0} is required")]
    MissingField(&'static str),
}

// =============================================================================
// Ranges and Buckets
// =============================================================================

/// Reporting window preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum AnalyticsRange {
    #[serde(rename = "24h")]
    Day,
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl AnalyticsRange {
    /// Length of the window.
    #[must_use]
    pub fn duration(self) -> Duration {
        match self {
            Self::Day => Duration::hours(24),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
            Self::Quarter => Duration::days(90),
        }
    }

    /// Bucket size used when the caller does not pick one.
    #[must_use]
    pub const fn default_bucket(self) -> Bucket {
        match self {
            Self::Day => Bucket::Hour,
            _ => Bucket::Day,
        }
    }

    /// Start of the window ending at `now`.
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }

    /// Parse an optional query value, falling back to the default range.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::InvalidRange` for an unknown value.
    pub fn parse_or_default(value: Option<&str>) -> Result<Self, AnalyticsError> {
        value.map_or(Ok(Self::default()), str::parse)
    }
}

impl FromStr for AnalyticsRange {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "24h" | "1d" => Ok(Self::Day),
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            "90d" => Ok(Self::Quarter),
            other => Err(AnalyticsError::InvalidRange(other.to_owned())),
        }
    }
}

/// Trend bucket granularity (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Hour,
    Day,
}

impl Bucket {
    const fn seconds(self) -> i64 {
        match self {
            Self::Hour => 3_600,
            Self::Day => 86_400,
        }
    }

    /// Floor a timestamp to the start of its bucket.
    #[must_use]
    pub fn truncate(self, t: DateTime<Utc>) -> DateTime<Utc> {
        let ts = t.timestamp();
        DateTime::from_timestamp(ts - ts.rem_euclid(self.seconds()), 0).unwrap_or(t)
    }
}

impl FromStr for Bucket {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "hour" | "hourly" => Ok(Self::Hour),
            "day" | "daily" => Ok(Self::Day),
            other => Err(AnalyticsError::InvalidBucket(other.to_owned())),
        }
    }
}

/// Bucket-aligned window for a trend chart: the bucket containing `now` and
/// the ones before it, covering the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendWindow {
    pub start: DateTime<Utc>,
    pub bucket: Bucket,
    pub count: usize,
}

impl TrendWindow {
    /// Window covering `range` with `bucket`-sized steps, ending at `now`.
    #[must_use]
    pub fn new(range: AnalyticsRange, bucket: Bucket, now: DateTime<Utc>) -> Self {
        let step = bucket.seconds();
        let count = (range.duration().num_seconds() / step).max(1);
        let start = bucket.truncate(now) - Duration::seconds(step * (count - 1));

        Self {
            start,
            bucket,
            count: usize::try_from(count).unwrap_or(1),
        }
    }

    /// Index of the bucket containing `t`, if inside the window.
    fn index_of(&self, t: DateTime<Utc>) -> Option<usize> {
        let offset = (t - self.start).num_seconds();
        if offset < 0 {
            return None;
        }
        usize::try_from(offset / self.bucket.seconds())
            .ok()
            .filter(|&i| i < self.count)
    }

    fn bucket_start(&self, index: usize) -> DateTime<Utc> {
        let index = i64::try_from(index).unwrap_or(i64::MAX);
        self.start + Duration::seconds(self.bucket.seconds().saturating_mul(index))
    }
}

// =============================================================================
// Sessions
// =============================================================================

/// Where a session came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TrafficSource {
    pub source: String,
    pub medium: String,
    pub campaign: Option<String>,
}

impl TrafficSource {
    /// Attribute a landing view: UTM tags win, then an external referrer
    /// host, then direct. `site_hosts` are the site's own hosts.
    #[must_use]
    pub fn from_landing(view: &PageView, site_hosts: &[String]) -> Self {
        if let Some(source) = &view.utm.source {
            return Self {
                source: source.to_lowercase(),
                medium: view
                    .utm
                    .medium
                    .as_ref()
                    .map_or_else(|| NO_MEDIUM.to_owned(), |m| m.to_lowercase()),
                campaign: view.utm.campaign.clone(),
            };
        }

        let external = view
            .referrer
            .as_deref()
            .and_then(referrer_host)
            .filter(|host| !site_hosts.iter().any(|own| own == host));

        match external {
            Some(host) => Self {
                source: host,
                medium: "referral".to_owned(),
                campaign: None,
            },
            None => Self {
                source: DIRECT_SOURCE.to_owned(),
                medium: NO_MEDIUM.to_owned(),
                campaign: None,
            },
        }
    }
}

/// Host of a referrer URL, lowercased and without a leading `www.`.
#[must_use]
pub fn referrer_host(referrer: &str) -> Option<String> {
    let url = url::Url::parse(referrer).ok()?;
    let host = url.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_owned();
    (!host.is_empty()).then_some(host)
}

/// One visitor session reconstructed from its views.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub landing_page: String,
    pub source: TrafficSource,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub views: usize,
    /// Sum of recorded time-on-page, or the span between first and last
    /// view when no duration was recorded.
    pub duration_seconds: i64,
}

impl SessionSummary {
    /// A session with a single view.
    #[must_use]
    pub const fn is_bounce(&self) -> bool {
        self.views == 1
    }
}

/// Group views into sessions, ordered by first view.
#[must_use]
pub fn sessions(views: &[PageView], site_hosts: &[String]) -> Vec<SessionSummary> {
    let mut grouped: HashMap<&str, Vec<&PageView>> = HashMap::new();
    for view in views {
        grouped.entry(view.session_id.as_str()).or_default().push(view);
    }

    let mut summaries: Vec<SessionSummary> = grouped
        .into_iter()
        .filter_map(|(id, mut views)| {
            views.sort_by_key(|v| (v.created_at, v.id));
            let first = *views.first()?;
            let last = *views.last()?;

            let recorded: Vec<i64> = views
                .iter()
                .filter_map(|v| v.duration_seconds.map(i64::from))
                .collect();
            let duration_seconds = if recorded.is_empty() {
                (last.created_at - first.created_at).num_seconds()
            } else {
                recorded.iter().sum()
            };

            Some(SessionSummary {
                session_id: id.to_owned(),
                landing_page: first.path.clone(),
                source: TrafficSource::from_landing(first, site_hosts),
                first_seen: first.created_at,
                last_seen: last.created_at,
                views: views.len(),
                duration_seconds,
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.first_seen
            .cmp(&b.first_seen)
            .then_with(|| a.session_id.cmp(&b.session_id))
    });
    summaries
}

// =============================================================================
// Overview
// =============================================================================

/// Views and sessions for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageStat {
    pub path: String,
    pub views: u64,
    pub sessions: u64,
}

/// Sessions arriving from one referring host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferrerStat {
    pub host: String,
    pub sessions: u64,
}

/// Headline numbers for a window.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub range: AnalyticsRange,
    pub total_views: u64,
    pub unique_sessions: u64,
    pub avg_session_seconds: f64,
    /// Percentage of sessions with exactly one view.
    pub bounce_rate: f64,
    pub views_per_session: f64,
    pub top_pages: Vec<PageStat>,
    pub top_referrers: Vec<ReferrerStat>,
}

/// Compute the overview report.
// Counts stay far below f64's exact-integer range (2^52)
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn overview(range: AnalyticsRange, views: &[PageView], site_hosts: &[String]) -> Overview {
    let sessions = sessions(views, site_hosts);
    let session_count = sessions.len();

    let (avg_session_seconds, bounce_rate, views_per_session) = if session_count == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let n = session_count as f64;
        let total_duration: i64 = sessions.iter().map(|s| s.duration_seconds).sum();
        let bounces = sessions.iter().filter(|s| s.is_bounce()).count();
        (
            round1(total_duration as f64 / n),
            round1(bounces as f64 * 100.0 / n),
            round1(views.len() as f64 / n),
        )
    };

    let mut referrers: HashMap<String, u64> = HashMap::new();
    for session in &sessions {
        if session.source.medium == "referral" {
            *referrers.entry(session.source.source.clone()).or_default() += 1;
        }
    }
    let mut top_referrers: Vec<ReferrerStat> = referrers
        .into_iter()
        .map(|(host, sessions)| ReferrerStat { host, sessions })
        .collect();
    top_referrers.sort_by(|a, b| b.sessions.cmp(&a.sessions).then_with(|| a.host.cmp(&b.host)));
    top_referrers.truncate(TOP_N);

    Overview {
        range,
        total_views: views.len() as u64,
        unique_sessions: session_count as u64,
        avg_session_seconds,
        bounce_rate,
        views_per_session,
        top_pages: top_pages(views, TOP_N),
        top_referrers,
    }
}

/// Most viewed paths, with the number of distinct sessions that saw each.
#[must_use]
pub fn top_pages(views: &[PageView], limit: usize) -> Vec<PageStat> {
    let mut by_path: HashMap<&str, (u64, HashSet<&str>)> = HashMap::new();
    for view in views {
        let entry = by_path.entry(view.path.as_str()).or_default();
        entry.0 += 1;
        entry.1.insert(view.session_id.as_str());
    }

    let mut pages: Vec<PageStat> = by_path
        .into_iter()
        .map(|(path, (views, sessions))| PageStat {
            path: path.to_owned(),
            views,
            sessions: sessions.len() as u64,
        })
        .collect();
    pages.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.path.cmp(&b.path)));
    pages.truncate(limit);
    pages
}

// =============================================================================
// Attribution
// =============================================================================

/// Sessions and views credited to one source/medium/campaign.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStat {
    pub source: String,
    pub medium: String,
    pub campaign: Option<String>,
    pub sessions: u64,
    pub views: u64,
    pub bounce_rate: f64,
}

/// First-touch attribution of sessions, most sessions first.
// Counts stay far below f64's exact-integer range (2^52)
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn attribution(views: &[PageView], site_hosts: &[String]) -> Vec<SourceStat> {
    let mut grouped: HashMap<TrafficSource, (u64, u64, u64)> = HashMap::new();
    for session in sessions(views, site_hosts) {
        let entry = grouped.entry(session.source).or_default();
        entry.0 += 1;
        entry.1 += session.views as u64;
        if session.views == 1 {
            entry.2 += 1;
        }
    }

    let mut stats: Vec<SourceStat> = grouped
        .into_iter()
        .map(|(source, (sessions, views, bounces))| SourceStat {
            source: source.source,
            medium: source.medium,
            campaign: source.campaign,
            sessions,
            views,
            bounce_rate: round1(bounces as f64 * 100.0 / sessions as f64),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.sessions
            .cmp(&a.sessions)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.medium.cmp(&b.medium))
            .then_with(|| a.campaign.cmp(&b.campaign))
    });
    stats
}

// =============================================================================
// Trends
// =============================================================================

/// Views and distinct sessions in one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub bucket_start: DateTime<Utc>,
    pub views: u64,
    pub sessions: u64,
}

/// Bucket views over the window, zero-filling empty buckets, oldest first.
#[must_use]
pub fn trends(window: &TrendWindow, views: &[PageView]) -> Vec<TrendPoint> {
    let mut buckets: Vec<(u64, HashSet<&str>)> = vec![(0, HashSet::new()); window.count];

    for view in views {
        if let Some(bucket) = window
            .index_of(view.created_at)
            .and_then(|i| buckets.get_mut(i))
        {
            bucket.0 += 1;
            bucket.1.insert(view.session_id.as_str());
        }
    }

    buckets
        .into_iter()
        .enumerate()
        .map(|(i, (views, sessions))| TrendPoint {
            bucket_start: window.bucket_start(i),
            views,
            sessions: sessions.len() as u64,
        })
        .collect()
}

// =============================================================================
// Realtime
// =============================================================================

/// Sessions currently on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivePage {
    pub path: String,
    pub sessions: i64,
}

/// Visitors active in the last few minutes.
#[derive(Debug, Clone, Serialize)]
pub struct Realtime {
    pub active_sessions: i64,
    pub window_minutes: i64,
    pub pages: Vec<ActivePage>,
    pub generated_at: DateTime<Utc>,
}

impl Realtime {
    /// Cutoff for "active" relative to `now`.
    #[must_use]
    pub fn cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::minutes(REALTIME_WINDOW_MINUTES)
    }

    /// Assemble the report from per-path session counts.
    #[must_use]
    pub fn new(active_sessions: i64, pages: Vec<(String, i64)>, now: DateTime<Utc>) -> Self {
        Self {
            active_sessions,
            window_minutes: REALTIME_WINDOW_MINUTES,
            pages: pages
                .into_iter()
                .take(TOP_N)
                .map(|(path, sessions)| ActivePage { path, sessions })
                .collect(),
            generated_at: now,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Utm;
    use academy_core::PageViewId;
    use chrono::TimeZone;

    pub(crate) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, hour, minute, 0).unwrap()
    }

    pub(crate) fn view(id: i64, session: &str, path: &str, at: DateTime<Utc>) -> PageView {
        PageView {
            id: PageViewId::new(id),
            session_id: session.to_owned(),
            path: path.to_owned(),
            referrer: None,
            utm: Utm::default(),
            user_agent: None,
            duration_seconds: None,
            created_at: at,
        }
    }

    fn sample() -> Vec<PageView> {
        let mut google = view(1, "sess-aaaa", "/", at(9, 0));
        google.referrer = Some("https://www.google.com/search?q=ai".to_owned());
        let mut google_next = view(2, "sess-aaaa", "/programs", at(9, 2));
        google_next.referrer = Some("https://academy.io/".to_owned());

        let mut campaign = view(3, "sess-bbbb", "/programs", at(10, 0));
        campaign.utm = Utm {
            source: Some("Newsletter".to_owned()),
            medium: Some("Email".to_owned()),
            campaign: Some("spring".to_owned()),
            ..Utm::default()
        };
        campaign.duration_seconds = Some(40);

        let direct = view(4, "sess-cccc", "/", at(10, 30));

        vec![google, google_next, campaign, direct]
    }

    #[test]
    fn test_range_parsing() {
        assert_eq!("24h".parse::<AnalyticsRange>().unwrap(), AnalyticsRange::Day);
        assert_eq!(
            AnalyticsRange::parse_or_default(None).unwrap(),
            AnalyticsRange::Week
        );
        assert_eq!(
            "1y".parse::<AnalyticsRange>(),
            Err(AnalyticsError::InvalidRange("1y".to_owned()))
        );
        assert_eq!(AnalyticsRange::Day.default_bucket(), Bucket::Hour);
        assert_eq!(AnalyticsRange::Month.default_bucket(), Bucket::Day);
    }

    #[test]
    fn test_sessions_use_first_view_for_attribution() {
        let sessions = sessions(&sample(), &[]);
        assert_eq!(sessions.len(), 3);

        let first = &sessions[0];
        assert_eq!(first.session_id, "sess-aaaa");
        assert_eq!(first.landing_page, "/");
        assert_eq!(first.views, 2);
        assert_eq!(first.duration_seconds, 120);
        assert_eq!(first.source.source, "google.com");
        assert_eq!(first.source.medium, "referral");

        let second = &sessions[1];
        assert_eq!(second.source.source, "newsletter");
        assert_eq!(second.source.medium, "email");
        assert_eq!(second.source.campaign.as_deref(), Some("spring"));
        assert_eq!(second.duration_seconds, 40);

        assert_eq!(sessions[2].source.source, DIRECT_SOURCE);
        assert_eq!(sessions[2].source.medium, NO_MEDIUM);
    }

    #[test]
    fn test_recorded_durations_take_precedence_over_span() {
        let mut a = view(1, "sess-dddd", "/", at(8, 0));
        a.duration_seconds = Some(15);
        let b = view(2, "sess-dddd", "/team", at(8, 30));
        let sessions = sessions(&[b, a], &[]);
        assert_eq!(sessions[0].duration_seconds, 15);
        assert_eq!(sessions[0].landing_page, "/");
    }

    #[test]
    fn test_overview() {
        let overview = overview(AnalyticsRange::Week, &sample(), &[]);
        assert_eq!(overview.total_views, 4);
        assert_eq!(overview.unique_sessions, 3);
        // (120 + 40 + 0) / 3
        assert!((overview.avg_session_seconds - 53.3).abs() < f64::EPSILON);
        assert!((overview.bounce_rate - 66.7).abs() < f64::EPSILON);
        assert!((overview.views_per_session - 1.3).abs() < f64::EPSILON);

        assert_eq!(overview.top_pages[0].path, "/");
        assert_eq!(overview.top_pages[0].views, 2);
        assert_eq!(overview.top_pages[0].sessions, 2);
        assert_eq!(
            overview.top_referrers,
            vec![ReferrerStat {
                host: "google.com".to_owned(),
                sessions: 1
            }]
        );
    }

    #[test]
    fn test_overview_of_empty_window() {
        let overview = overview(AnalyticsRange::Day, &[], &[]);
        assert_eq!(overview.total_views, 0);
        assert!(overview.bounce_rate.abs() < f64::EPSILON);
        assert!(overview.top_pages.is_empty());
    }

    #[test]
    fn test_attribution_groups_sessions() {
        let mut views = sample();
        views.push(view(5, "sess-eeee", "/blog", at(11, 0)));
        views.push(view(6, "sess-eeee", "/blog/x", at(11, 1)));

        let stats = attribution(&views, &[]);
        assert_eq!(stats[0].source, DIRECT_SOURCE);
        assert_eq!(stats[0].sessions, 2);
        assert_eq!(stats[0].views, 3);
        assert!((stats[0].bounce_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(stats.len(), 3);
    }

    #[test]
    fn test_trends_zero_fill_hours() {
        let window = TrendWindow::new(AnalyticsRange::Day, Bucket::Hour, at(10, 45));
        assert_eq!(window.count, 24);
        assert_eq!(window.start, at(10, 0) - Duration::hours(23));

        let points = trends(&window, &sample());
        assert_eq!(points.len(), 24);
        assert_eq!(points.last().unwrap().bucket_start, at(10, 0));
        assert_eq!(points.last().unwrap().views, 2);
        assert_eq!(points.last().unwrap().sessions, 2);
        assert_eq!(points[22].views, 2);
        assert_eq!(points[22].sessions, 1);
        assert_eq!(points.iter().map(|p| p.views).sum::<u64>(), 4);
        assert!(points.windows(2).all(|w| w[0].bucket_start < w[1].bucket_start));
    }

    #[test]
    fn test_trends_daily_window() {
        let window = TrendWindow::new(AnalyticsRange::Week, Bucket::Day, at(10, 45));
        assert_eq!(window.count, 7);
        let points = trends(&window, &sample());
        assert_eq!(points[6].bucket_start, Bucket::Day.truncate(at(10, 45)));
        assert_eq!(points[6].views, 4);
        assert!(points[..6].iter().all(|p| p.views == 0));
    }

    #[test]
    fn test_own_site_referrer_counts_as_direct() {
        let site = vec!["academy.io".to_owned()];
        let mut internal = view(1, "sess-ffff", "/blog", at(9, 0));
        internal.referrer = Some("https://www.academy.io/blog".to_owned());

        let source = TrafficSource::from_landing(&internal, &site);
        assert_eq!(source.source, DIRECT_SOURCE);
        assert_eq!(source.medium, NO_MEDIUM);

        let overview = overview(AnalyticsRange::Week, &[internal.clone()], &site);
        assert!(overview.top_referrers.is_empty());
        assert_eq!(attribution(&[internal.clone()], &site)[0].source, DIRECT_SOURCE);

        // Without the site host the same view is a referral.
        assert_eq!(TrafficSource::from_landing(&internal, &[]).medium, "referral");
    }

    #[test]
    fn test_trends_ignore_views_outside_window() {
        let window = TrendWindow::new(AnalyticsRange::Day, Bucket::Hour, at(10, 45));
        let before = view(1, "sess-gggg", "/", window.start - Duration::minutes(1));
        let after = view(2, "sess-gggg", "/", at(12, 0));
        let inside = view(3, "sess-gggg", "/", at(10, 5));

        let points = trends(&window, &[before, after, inside]);
        assert_eq!(points.len(), 24);
        assert_eq!(points.iter().map(|p| p.views).sum::<u64>(), 1);
    }

    #[test]
    fn test_referrer_host() {
        assert_eq!(
            referrer_host("https://WWW.LinkedIn.com/feed").as_deref(),
            Some("linkedin.com")
        );
        assert_eq!(referrer_host("not a url"), None);
    }

    #[test]
    fn test_realtime_report() {
        let now = at(12, 0);
        assert_eq!(Realtime::cutoff(now), at(11, 55));
        let report = Realtime::new(3, vec![("/".to_owned(), 2), ("/blog".to_owned(), 1)], now);
        assert_eq!(report.window_minutes, 5);
        assert_eq!(report.pages[0].path, "/");
    }
}
