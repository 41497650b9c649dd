//! Read-only collaborators the analytics pipeline depends on.
//!
//! Each trait is a seam over a hosted store. The in-memory implementations
//! in [`crate::memory`] back development and tests; production deployments
//! plug in their own (see [`crate::clickhouse_store`] for counters).

use async_trait::async_trait;
use chrono::NaiveDate;
use creator_core::types::{
    DailyCounterRow, RegistrationRecord, RegistryEntry, SecondaryChannelApproval,
};
use creator_core::InsightsResult;

/// Primary registrations and per-channel grants.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// The user's primary registration. `Ok(None)` when the user never registered.
    async fn primary_registration(
        &self,
        user_id: &str,
    ) -> InsightsResult<Option<RegistrationRecord>>;

    /// Every secondary grant recorded for the user, whatever its status.
    async fn secondary_approvals(
        &self,
        user_id: &str,
    ) -> InsightsResult<Vec<SecondaryChannelApproval>>;
}

/// Maps channel names to analytics channel identifiers.
#[async_trait]
pub trait ChannelRegistry: Send + Sync {
    /// Entry whose name equals `name` exactly.
    async fn find_exact(&self, name: &str) -> InsightsResult<Option<RegistryEntry>>;

    /// First entry whose name contains `name`, ignoring case.
    async fn find_fuzzy(&self, name: &str) -> InsightsResult<Option<RegistryEntry>>;
}

/// Per-day, per-channel raw counters.
#[async_trait]
pub trait CountersStore: Send + Sync {
    /// Rows for the given channels with `start <= date <= end`, in any order.
    async fn daily_counters(
        &self,
        channel_ids: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> InsightsResult<Vec<DailyCounterRow>>;
}
