//! Raw counter fetch with the empty-on-failure policy.

use crate::collaborators::CountersStore;
use chrono::NaiveDate;
use creator_core::types::DailyCounterRow;
use tracing::{debug, error};

/// Fetch counters for `channel_ids` over `[start, end]`.
///
/// An empty channel list returns immediately without touching the store.
/// A store error is logged and reported as no rows.
pub async fn fetch_daily_counters(
    store: &dyn CountersStore,
    channel_ids: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DailyCounterRow> {
    if channel_ids.is_empty() {
        debug!("No channels selected, skipping counters fetch");
        return Vec::new();
    }
    if start > end {
        debug!(start = %start, end = %end, "Inverted date range, skipping counters fetch");
        return Vec::new();
    }

    match store.daily_counters(channel_ids, start, end).await {
        Ok(rows) => {
            debug!(
                channels = channel_ids.len(),
                rows = rows.len(),
                "Counters fetched"
            );
            rows
        }
        Err(e) => {
            metrics::counter!("analytics.fetch_errors").increment(1);
            error!(
                error = %e,
                channels = channel_ids.len(),
                start = %start,
                end = %end,
                "Counters fetch failed, reporting no data"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use creator_core::{InsightsError, InsightsResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl CountersStore for CountingStore {
        async fn daily_counters(
            &self,
            channel_ids: &[String],
            start: NaiveDate,
            _end: NaiveDate,
        ) -> InsightsResult<Vec<DailyCounterRow>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(InsightsError::Storage("timeout".to_string()));
            }
            Ok(channel_ids
                .iter()
                .map(|id| DailyCounterRow {
                    date: start,
                    channel_id: id.clone(),
                    views: 1,
                    premium_views: 0,
                    revenue_raw: 0.1,
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_empty_channel_list_short_circuits() {
        let store = CountingStore::default();
        let rows = fetch_daily_counters(&store, &[], day("2024-01-01"), day("2024-01-05")).await;
        assert!(rows.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_error_is_empty() {
        let store = CountingStore {
            fail: true,
            ..Default::default()
        };
        let rows = fetch_daily_counters(
            &store,
            &["c1".to_string()],
            day("2024-01-01"),
            day("2024-01-05"),
        )
        .await;
        assert!(rows.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rows_passed_through() {
        let store = CountingStore::default();
        let rows = fetch_daily_counters(
            &store,
            &["c1".to_string(), "c2".to_string()],
            day("2024-01-01"),
            day("2024-01-05"),
        )
        .await;
        assert_eq!(rows.len(), 2);
    }
}
