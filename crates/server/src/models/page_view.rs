//! First-party analytics records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use academy_core::PageViewId;

/// Campaign attribution fields carried on a page view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utm {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub term: Option<String>,
    pub content: Option<String>,
}

impl Utm {
    /// Whether any campaign field is present.
    #[must_use]
    pub const fn is_tagged(&self) -> bool {
        self.source.is_some() || self.medium.is_some() || self.campaign.is_some()
    }
}

/// A recorded page view.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub id: PageViewId,
    pub session_id: String,
    pub path: String,
    pub referrer: Option<String>,
    pub utm: Utm,
    pub user_agent: Option<String>,
    pub duration_seconds: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// A validated page view ready to insert.
#[derive(Debug, Clone)]
pub struct NewPageView {
    pub session_id: String,
    pub path: String,
    pub referrer: Option<String>,
    pub utm: Utm,
    pub user_agent: Option<String>,
    pub duration_seconds: Option<i32>,
}
