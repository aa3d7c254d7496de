//! Integration tests for click analytics
//!
//! Clicks with explicit timestamps are written straight to storage so the
//! windowing logic can be checked against fixed dates.

use chrono::{NaiveDate, Utc};
use snaplink::analytics::{AnalyticsAggregator, DailyClicks, PendingClick, RECENT_CLICKS_LIMIT};
use snaplink::models::{NewClickEvent, NewShortLink};
use snaplink::storage::{SqliteStorage, Storage};
use snaplink::ServiceError;
use std::sync::Arc;

async fn create_test_storage() -> Arc<dyn Storage> {
    let storage = SqliteStorage::new("sqlite::memory:", 5).await.unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

async fn create_link(storage: &Arc<dyn Storage>, code: &str) {
    storage
        .insert_link(&NewShortLink {
            short_code: code.to_string(),
            original_url: "https://example.com".to_string(),
            is_custom: true,
        })
        .await
        .unwrap();
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ts(day: NaiveDate, h: u32, m: u32, s: u32) -> i64 {
    day.and_hms_opt(h, m, s).unwrap().and_utc().timestamp()
}

async fn click_at(storage: &Arc<dyn Storage>, code: &str, timestamp: i64) {
    storage
        .insert_click(&NewClickEvent {
            short_code: code.to_string(),
            ip_address: "198.51.100.1".to_string(),
            user_agent: format!("agent-{}", timestamp),
            referer: None,
            timestamp,
        })
        .await
        .unwrap();
}

fn pending(code: &str, n: usize) -> PendingClick {
    PendingClick {
        short_code: code.to_string(),
        ip_address: "203.0.113.5".to_string(),
        user_agent: format!("agent-{:02}", n),
        referer: Some("https://ref.example.com".to_string()),
    }
}

#[tokio::test]
async fn test_fifteen_clicks_keep_last_ten_in_order() {
    let storage = create_test_storage().await;
    let aggregator = AnalyticsAggregator::new(Arc::clone(&storage));
    create_link(&storage, "busy").await;

    for n in 0..15 {
        aggregator.record_click(pending("busy", n)).await.unwrap();
    }

    let analytics = aggregator.get_analytics("busy").await.unwrap();
    assert_eq!(analytics.short_code, "busy");
    assert_eq!(analytics.total_clicks, 15);
    assert_eq!(analytics.recent_clicks.len(), RECENT_CLICKS_LIMIT as usize);

    let agents: Vec<String> = analytics
        .recent_clicks
        .iter()
        .map(|c| c.user_agent.clone())
        .collect();
    let expected: Vec<String> = (5..15).map(|n| format!("agent-{:02}", n)).collect();
    assert_eq!(agents, expected);
    assert!(analytics
        .recent_clicks
        .windows(2)
        .all(|w| (w[0].timestamp, w[0].id) < (w[1].timestamp, w[1].id)));
}

#[tokio::test]
async fn test_recent_clicks_follow_timestamps() {
    let storage = create_test_storage().await;
    let aggregator = AnalyticsAggregator::new(Arc::clone(&storage));
    create_link(&storage, "late").await;

    // Inserted out of order
    for t in [500, 100, 400, 200, 300] {
        click_at(&storage, "late", t).await;
    }

    let analytics = aggregator.get_analytics("late").await.unwrap();
    let times: Vec<i64> = analytics.recent_clicks.iter().map(|c| c.timestamp).collect();
    assert_eq!(times, vec![100, 200, 300, 400, 500]);
}

#[tokio::test]
async fn test_analytics_with_no_clicks() {
    let storage = create_test_storage().await;
    let aggregator = AnalyticsAggregator::new(Arc::clone(&storage));
    create_link(&storage, "fresh").await;

    let analytics = aggregator.get_analytics("fresh").await.unwrap();
    assert_eq!(analytics.total_clicks, 0);
    assert!(analytics.recent_clicks.is_empty());

    let link = storage.find_by_code("fresh").await.unwrap().unwrap();
    assert_eq!(analytics.created_at.timestamp(), link.created_at);
}

#[tokio::test]
async fn test_analytics_survive_deactivation() {
    let storage = create_test_storage().await;
    let aggregator = AnalyticsAggregator::new(Arc::clone(&storage));
    create_link(&storage, "gone").await;

    aggregator.record_click(pending("gone", 1)).await.unwrap();
    storage.set_active("gone", false).await.unwrap();
    aggregator.record_click(pending("gone", 2)).await.unwrap();

    let analytics = aggregator.get_analytics("gone").await.unwrap();
    assert_eq!(analytics.total_clicks, 2);
}

#[tokio::test]
async fn test_analytics_for_unknown_code() {
    let storage = create_test_storage().await;
    let aggregator = AnalyticsAggregator::new(Arc::clone(&storage));

    assert!(matches!(
        aggregator.get_analytics("nope").await,
        Err(ServiceError::NotFound)
    ));
}

#[tokio::test]
async fn test_click_stats_two_days_without_zero_fill() {
    let storage = create_test_storage().await;
    let aggregator = AnalyticsAggregator::new(Arc::clone(&storage));
    let today = date(2024, 6, 20);

    click_at(&storage, "stats", ts(date(2024, 6, 10), 9, 0, 0)).await;
    click_at(&storage, "stats", ts(date(2024, 6, 10), 18, 30, 0)).await;
    click_at(&storage, "stats", ts(date(2024, 6, 3), 12, 0, 0)).await;

    let stats = aggregator.get_click_stats_on("stats", today).await.unwrap();
    assert_eq!(stats.total_clicks, 3);
    assert_eq!(
        stats.daily_clicks,
        vec![
            DailyClicks {
                date: date(2024, 6, 3),
                clicks: 1
            },
            DailyClicks {
                date: date(2024, 6, 10),
                clicks: 2
            },
        ]
    );
}

#[tokio::test]
async fn test_click_stats_window_crosses_month_and_year() {
    let storage = create_test_storage().await;
    let aggregator = AnalyticsAggregator::new(Arc::clone(&storage));
    // Window is 2023-12-06 ..= 2024-01-05
    let today = date(2024, 1, 5);

    click_at(&storage, "edge", ts(date(2023, 12, 5), 23, 59, 59)).await; // day 31, outside
    click_at(&storage, "edge", ts(date(2023, 12, 6), 0, 0, 0)).await; // first day, inside
    click_at(&storage, "edge", ts(date(2023, 12, 31), 12, 0, 0)).await;
    click_at(&storage, "edge", ts(date(2024, 1, 5), 23, 59, 59)).await; // today, inside
    click_at(&storage, "edge", ts(date(2024, 1, 6), 0, 0, 0)).await; // tomorrow, outside

    let stats = aggregator.get_click_stats_on("edge", today).await.unwrap();
    assert_eq!(stats.total_clicks, 5, "total is not windowed");

    let days: Vec<NaiveDate> = stats.daily_clicks.iter().map(|d| d.date).collect();
    assert_eq!(
        days,
        vec![date(2023, 12, 6), date(2023, 12, 31), date(2024, 1, 5)]
    );
    assert!(stats.daily_clicks.iter().all(|d| d.clicks == 1));
}

#[tokio::test]
async fn test_click_stats_for_today() {
    let storage = create_test_storage().await;
    let aggregator = AnalyticsAggregator::new(Arc::clone(&storage));

    aggregator.record_click(pending("now", 0)).await.unwrap();
    aggregator.record_click(pending("now", 1)).await.unwrap();

    let stats = aggregator.get_click_stats("now").await.unwrap();
    assert_eq!(stats.total_clicks, 2);
    assert_eq!(stats.daily_clicks.len(), 1);
    assert_eq!(stats.daily_clicks[0].clicks, 2);

    // A click at 23:59:59 can land on the next day between record and query
    let today = Utc::now().date_naive();
    assert!(stats.daily_clicks[0].date <= today);
}
