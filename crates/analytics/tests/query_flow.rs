//! End-to-end query flow over the seeded in-memory stores.

use chrono::NaiveDate;
use creator_analytics::{AnalyticsService, InMemoryBackend, SeedData};
use creator_cache::ResolutionCache;
use creator_core::DateRange;
use std::sync::Arc;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn service() -> AnalyticsService {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/seed.json");
    let backend = InMemoryBackend::from_seed(SeedData::from_path(path).unwrap());
    AnalyticsService::new(
        backend.registrations.clone(),
        backend.registry.clone(),
        backend.counters.clone(),
        Arc::new(ResolutionCache::new(60, 100)),
    )
}

#[tokio::test]
async fn test_seeded_report() {
    let report = service()
        .query("creator-1", DateRange::new(day("2024-01-01"), day("2024-01-04")), None)
        .await;

    // Primary channel plus the fuzzy-matched secondary; the rejected one is absent.
    let mut ids: Vec<&str> = report.channels.iter().map(|c| c.channel_id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["UC-bake-002", "UC-cook-001"]);
    assert_eq!(report.split_percent, 70.0);

    let views: Vec<u64> = report.daily_data.iter().map(|d| d.views).collect();
    assert_eq!(views, vec![1250, 0, 800, 0]);
    assert_eq!(report.daily_data[0].revenue, 11.75);
    assert_eq!(report.daily_data[0].rpm, 9.4);

    assert_eq!(report.summary.total_views, 2050);
    assert_eq!(report.summary.total_premium_views, 125);
    assert_eq!(report.summary.total_revenue, 18.15);
    // 18.15 * 0.7 / 2050 * 1000 = 6.1975…
    assert_eq!(report.summary.average_rpm, 6.19);

    assert_eq!(report.channel_totals[0].channel_id, "UC-cook-001");
    assert_eq!(report.channel_totals[0].revenue, 16.4);
    assert_eq!(report.channel_totals[1].display_name, "Baking Basics");
}

#[tokio::test]
async fn test_pending_registration_sees_nothing() {
    let report = service()
        .query("creator-2", DateRange::new(day("2024-01-01"), day("2024-01-04")), None)
        .await;
    assert!(report.channels.is_empty());
    assert_eq!(report.split_percent, 100.0);
    assert_eq!(report.daily_data.len(), 4);
    assert_eq!(report.summary.total_views, 0);
}

#[tokio::test]
async fn test_single_day_range() {
    let report = service()
        .query(
            "creator-1",
            DateRange::new(day("2024-01-03"), day("2024-01-03")),
            Some("UC-cook-001"),
        )
        .await;
    assert_eq!(report.daily_data.len(), 1);
    assert_eq!(report.summary.total_views, 800);
    assert_eq!(report.summary.total_premium_views, 0);
    assert_eq!(report.summary.total_revenue, 6.4);
}
