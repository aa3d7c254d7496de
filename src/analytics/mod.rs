//! Click analytics
//!
//! Clicks are recorded off the redirect path through [`ClickRecorder`] and
//! read back as totals, recent events, and per-day counts through
//! [`AnalyticsAggregator`].

pub mod aggregator;
pub mod ip_extractor;
pub mod models;
pub mod recorder;

pub use aggregator::{AnalyticsAggregator, RECENT_CLICKS_LIMIT, STATS_WINDOW_DAYS};
pub use ip_extractor::extract_client_ip;
pub use models::{ClickStats, DailyClicks, LinkAnalytics, PendingClick};
pub use recorder::ClickRecorder;
