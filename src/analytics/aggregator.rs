//! Click recording and aggregate views over stored click events
//!
//! The aggregator holds no counters of its own; every view is computed from
//! storage on request.

use anyhow::anyhow;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use std::sync::Arc;

use crate::analytics::models::{ClickStats, DailyClicks, LinkAnalytics, PendingClick};
use crate::error::{ServiceError, ServiceResult};
use crate::models::NewClickEvent;
use crate::storage::Storage;

/// Number of clicks returned in `LinkAnalytics::recent_clicks`
pub const RECENT_CLICKS_LIMIT: i64 = 10;

/// Days before today covered by `ClickStats::daily_clicks`
pub const STATS_WINDOW_DAYS: u64 = 30;

pub struct AnalyticsAggregator {
    storage: Arc<dyn Storage>,
}

impl AnalyticsAggregator {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Store one click, stamped with the current time.
    ///
    /// The code is not checked against existing links, so clicks for
    /// deactivated links are still accepted.
    pub async fn record_click(&self, click: PendingClick) -> ServiceResult<()> {
        let event = NewClickEvent {
            short_code: click.short_code,
            ip_address: click.ip_address,
            user_agent: click.user_agent,
            referer: click.referer,
            timestamp: Utc::now().timestamp(),
        };

        self.storage
            .insert_click(&event)
            .await
            .map_err(|e| ServiceError::storage("insert_click", e))
    }

    /// Total and recent clicks for a link, active or not.
    pub async fn get_analytics(&self, short_code: &str) -> ServiceResult<LinkAnalytics> {
        let link = self
            .storage
            .find_by_code(short_code)
            .await
            .map_err(|e| ServiceError::storage("find_by_code", e))?
            .ok_or(ServiceError::NotFound)?;

        let total_clicks = self
            .storage
            .count_clicks(short_code)
            .await
            .map_err(|e| ServiceError::storage("count_clicks", e))?;

        let recent_clicks = self
            .storage
            .list_clicks(short_code, Some(RECENT_CLICKS_LIMIT))
            .await
            .map_err(|e| ServiceError::storage("list_clicks", e))?;

        let created_at = DateTime::from_timestamp(link.created_at, 0).ok_or_else(|| {
            ServiceError::storage(
                "get_analytics",
                anyhow!("created_at {} is out of range", link.created_at),
            )
        })?;

        Ok(LinkAnalytics {
            short_code: link.short_code,
            total_clicks,
            recent_clicks,
            created_at,
        })
    }

    /// Total clicks plus per-day counts for the trailing window ending today (UTC).
    pub async fn get_click_stats(&self, short_code: &str) -> ServiceResult<ClickStats> {
        self.get_click_stats_on(short_code, Utc::now().date_naive())
            .await
    }

    /// Same as [`get_click_stats`](Self::get_click_stats) with an explicit "today".
    ///
    /// Covers `[today - 30 days, today]` inclusive using calendar arithmetic,
    /// so windows crossing month or year boundaries are exact. Days without
    /// clicks are omitted.
    pub async fn get_click_stats_on(
        &self,
        short_code: &str,
        today: NaiveDate,
    ) -> ServiceResult<ClickStats> {
        let total_clicks = self
            .storage
            .count_clicks(short_code)
            .await
            .map_err(|e| ServiceError::storage("count_clicks", e))?;

        let first_day = today
            .checked_sub_days(Days::new(STATS_WINDOW_DAYS))
            .ok_or_else(|| ServiceError::storage("get_click_stats", anyhow!("window start out of range")))?;
        let day_after = today
            .succ_opt()
            .ok_or_else(|| ServiceError::storage("get_click_stats", anyhow!("window end out of range")))?;

        let since = first_day.and_time(NaiveTime::MIN).and_utc().timestamp();
        let until = day_after.and_time(NaiveTime::MIN).and_utc().timestamp();

        let rows = self
            .storage
            .daily_click_counts(short_code, since, until)
            .await
            .map_err(|e| ServiceError::storage("daily_click_counts", e))?;

        let daily_clicks = rows
            .into_iter()
            .map(|(day, clicks)| {
                NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map(|date| DailyClicks { date, clicks })
                    .map_err(|e| ServiceError::storage("daily_click_counts", e))
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(ClickStats {
            total_clicks,
            daily_clicks,
        })
    }
}
