//! Data models for click analytics

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ClickEvent;

/// Click metadata captured on the redirect path, before a timestamp is assigned
#[derive(Debug, Clone)]
pub struct PendingClick {
    pub short_code: String,
    pub ip_address: String,
    pub user_agent: String,
    pub referer: Option<String>,
}

/// Summary of a link's traffic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkAnalytics {
    pub short_code: String,

    /// Every click ever recorded, uncapped
    pub total_clicks: i64,

    /// The latest clicks, oldest first
    pub recent_clicks: Vec<ClickEvent>,

    pub created_at: DateTime<Utc>,
}

/// Clicks on a single UTC calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickStats {
    pub total_clicks: i64,

    /// Days with at least one click in the trailing window, ascending
    pub daily_clicks: Vec<DailyClicks>,
}
