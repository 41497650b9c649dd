//! Analytics query orchestration: resolve → fetch → aggregate.

use crate::aggregate::{aggregate, channel_totals};
use crate::collaborators::{ChannelRegistry, CountersStore, RegistrationStore};
use crate::fetch::fetch_daily_counters;
use crate::resolver::{recover, ChannelResolver};
use chrono::Utc;
use creator_cache::ResolutionCache;
use creator_core::range::DateRange;
use creator_core::types::{AnalyticsReport, ResolvedChannels};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct AnalyticsService {
    resolver: ChannelResolver,
    counters: Arc<dyn CountersStore>,
    cache: Arc<ResolutionCache>,
}

impl AnalyticsService {
    pub fn new(
        registrations: Arc<dyn RegistrationStore>,
        registry: Arc<dyn ChannelRegistry>,
        counters: Arc<dyn CountersStore>,
        cache: Arc<ResolutionCache>,
    ) -> Self {
        Self {
            resolver: ChannelResolver::new(registrations, registry),
            counters,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Channels visible to `user_id`. Only successful resolutions are cached,
    /// so a transient store failure is retried on the next query.
    pub async fn resolve_channels(&self, user_id: &str) -> ResolvedChannels {
        if let Some(cached) = self.cache.get(user_id) {
            debug!(user_id = %user_id, "Channel resolution served from cache");
            return cached;
        }

        let result = self.resolver.resolve(user_id).await;
        if let Ok(resolved) = &result {
            self.cache.put(user_id.to_string(), resolved.clone());
        }
        recover(user_id, result)
    }

    /// Drop any cached resolution for `user_id` and resolve again, e.g. after
    /// the user's registration or grants changed.
    pub async fn refresh_channels(&self, user_id: &str) -> ResolvedChannels {
        self.cache.invalidate(user_id);
        self.resolve_channels(user_id).await
    }

    /// Build the full report for one dashboard query.
    ///
    /// `channel_filter` narrows the query to one of the user's channels; a
    /// channel the user cannot see produces a zero-filled report.
    pub async fn query(
        &self,
        user_id: &str,
        range: DateRange,
        channel_filter: Option<&str>,
    ) -> AnalyticsReport {
        let started = Instant::now();
        metrics::counter!("analytics.queries").increment(1);

        let resolved = self.resolve_channels(user_id).await;
        let scope = match channel_filter {
            Some(channel_id) => ResolvedChannels {
                split_percent: resolved.split_percent,
                channels: resolved.find(channel_id).cloned().into_iter().collect(),
            },
            None => resolved,
        };
        let channel_ids = scope.channel_ids();

        let rows =
            fetch_daily_counters(self.counters.as_ref(), &channel_ids, range.start, range.end)
                .await;
        let result = aggregate(&rows, scope.split_percent, range.start, range.end);
        let totals = channel_totals(&rows, &scope.channels, range.start, range.end);

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        metrics::histogram!("analytics.query_duration_ms").record(elapsed_ms);
        info!(
            user_id = %user_id,
            start = %range.start,
            end = %range.end,
            channels = scope.channels.len(),
            rows = rows.len(),
            total_views = result.summary.total_views,
            elapsed_ms = elapsed_ms,
            "Analytics query completed"
        );

        AnalyticsReport {
            user_id: user_id.to_string(),
            range,
            split_percent: scope.split_percent,
            channels: scope.channels,
            daily_data: result.daily_data,
            summary: result.summary,
            channel_totals: totals,
            generated_at: Utc::now(),
        }
    }
}
