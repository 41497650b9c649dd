//! Creator analytics: channel resolution, counter fetch and aggregation.
#![warn(clippy::unwrap_used)]

pub mod aggregate;
pub mod clickhouse_store;
pub mod collaborators;
pub mod fetch;
pub mod memory;
pub mod resolver;
pub mod service;

pub use aggregate::{aggregate, channel_totals, rpm, summarize};
pub use clickhouse_store::ClickHouseCountersStore;
pub use collaborators::{ChannelRegistry, CountersStore, RegistrationStore};
pub use fetch::fetch_daily_counters;
pub use memory::{InMemoryBackend, SeedData};
pub use resolver::ChannelResolver;
pub use service::AnalyticsService;
