//! In-memory collaborator stores backed by DashMap.
//!
//! Development and test stand-ins for the hosted registration, registry and
//! counters tables. Optionally seeded from a JSON file.

use crate::collaborators::{ChannelRegistry, CountersStore, RegistrationStore};
use async_trait::async_trait;
use chrono::NaiveDate;
use creator_core::types::{
    DailyCounterRow, RegistrationRecord, RegistryEntry, SecondaryChannelApproval,
};
use creator_core::InsightsResult;
use dashmap::DashMap;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

// ─── Registrations ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryRegistrationStore {
    primary: DashMap<String, RegistrationRecord>,
    secondary: DashMap<String, Vec<SecondaryChannelApproval>>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user's primary registration.
    pub fn upsert_registration(&self, record: RegistrationRecord) {
        self.primary.insert(record.user_id.clone(), record);
    }

    pub fn add_secondary_approval(&self, approval: SecondaryChannelApproval) {
        self.secondary
            .entry(approval.user_id.clone())
            .or_default()
            .push(approval);
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn primary_registration(
        &self,
        user_id: &str,
    ) -> InsightsResult<Option<RegistrationRecord>> {
        Ok(self.primary.get(user_id).map(|r| r.value().clone()))
    }

    async fn secondary_approvals(
        &self,
        user_id: &str,
    ) -> InsightsResult<Vec<SecondaryChannelApproval>> {
        Ok(self
            .secondary
            .get(user_id)
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }
}

// ─── Channel registry ───────────────────────────────────────────────────────

/// Name → identifier registry. Fuzzy lookups scan entries in name order so
/// that "first match" is deterministic.
#[derive(Default)]
pub struct InMemoryChannelRegistry {
    by_name: DashMap<String, RegistryEntry>,
}

impl InMemoryChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, entry: RegistryEntry) {
        self.by_name.insert(entry.channel_name.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[async_trait]
impl ChannelRegistry for InMemoryChannelRegistry {
    async fn find_exact(&self, name: &str) -> InsightsResult<Option<RegistryEntry>> {
        Ok(self.by_name.get(name).map(|r| r.value().clone()))
    }

    async fn find_fuzzy(&self, name: &str) -> InsightsResult<Option<RegistryEntry>> {
        let needle = name.to_lowercase();
        let mut matches: Vec<RegistryEntry> = self
            .by_name
            .iter()
            .filter(|r| r.value().channel_name.to_lowercase().contains(&needle))
            .map(|r| r.value().clone())
            .collect();
        matches.sort_by(|a, b| a.channel_name.cmp(&b.channel_name));
        Ok(matches.into_iter().next())
    }
}

// ─── Counters ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryCountersStore {
    rows: DashMap<String, Vec<DailyCounterRow>>,
}

impl InMemoryCountersStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row. Rows are immutable once written; duplicates for the same
    /// `(channel, date)` are kept and summed by the aggregator.
    pub fn append(&self, row: DailyCounterRow) {
        self.rows.entry(row.channel_id.clone()).or_default().push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.iter().map(|r| r.value().len()).sum()
    }
}

#[async_trait]
impl CountersStore for InMemoryCountersStore {
    async fn daily_counters(
        &self,
        channel_ids: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> InsightsResult<Vec<DailyCounterRow>> {
        let mut out = Vec::new();
        for channel_id in channel_ids {
            if let Some(rows) = self.rows.get(channel_id) {
                out.extend(
                    rows.value()
                        .iter()
                        .filter(|row| row.date >= start && row.date <= end)
                        .cloned(),
                );
            }
        }
        Ok(out)
    }
}

// ─── Seeding ────────────────────────────────────────────────────────────────

/// JSON document used to populate the in-memory stores.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    #[serde(default)]
    pub registrations: Vec<RegistrationRecord>,
    #[serde(default)]
    pub secondary_approvals: Vec<SecondaryChannelApproval>,
    #[serde(default)]
    pub registry: Vec<RegistryEntry>,
    #[serde(default)]
    pub counters: Vec<DailyCounterRow>,
}

impl SeedData {
    pub fn from_path(path: impl AsRef<Path>) -> InsightsResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// The three in-memory stores, sharing one seed.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    pub registrations: Arc<InMemoryRegistrationStore>,
    pub registry: Arc<InMemoryChannelRegistry>,
    pub counters: Arc<InMemoryCountersStore>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: SeedData) -> Self {
        let backend = Self::new();
        let registrations = seed.registrations.len();
        let rows = seed.counters.len();

        for record in seed.registrations {
            backend.registrations.upsert_registration(record);
        }
        for approval in seed.secondary_approvals {
            backend.registrations.add_secondary_approval(approval);
        }
        for entry in seed.registry {
            backend.registry.register(entry);
        }
        for row in seed.counters {
            backend.counters.append(row);
        }

        info!(
            registrations = registrations,
            registry_entries = backend.registry.len(),
            counter_rows = rows,
            "In-memory stores seeded"
        );
        backend
    }
}
