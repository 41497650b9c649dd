//! Channel resolution: which analytics channels a user may see, and the
//! revenue split recorded for them.

use crate::collaborators::{ChannelRegistry, RegistrationStore};
use creator_core::numeric::normalize_split_percent;
use creator_core::types::{ApprovalStatus, ChannelIdentity, RegistryEntry, ResolvedChannels};
use creator_core::{InsightsError, InsightsResult};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ChannelResolver {
    registrations: Arc<dyn RegistrationStore>,
    registry: Arc<dyn ChannelRegistry>,
}

impl ChannelResolver {
    pub fn new(registrations: Arc<dyn RegistrationStore>, registry: Arc<dyn ChannelRegistry>) -> Self {
        Self {
            registrations,
            registry,
        }
    }

    /// Resolve a user's channels, recovering from every failure.
    ///
    /// A missing registration or a store error yields [`ResolvedChannels::empty`].
    pub async fn resolve_channels(&self, user_id: &str) -> ResolvedChannels {
        recover(user_id, self.resolve(user_id).await)
    }

    /// Resolve a user's channels, surfacing lookup failures to the caller.
    pub async fn resolve(&self, user_id: &str) -> InsightsResult<ResolvedChannels> {
        let record = self
            .registrations
            .primary_registration(user_id)
            .await?
            .ok_or_else(|| InsightsError::NotFound(format!("registration for user {}", user_id)))?;

        let split_percent = normalize_split_percent(record.split_percent);

        if record.status != ApprovalStatus::Approved {
            debug!(user_id = %user_id, status = ?record.status, "Registration not approved, no channels visible");
            return Ok(ResolvedChannels {
                split_percent,
                channels: Vec::new(),
            });
        }

        let mut names = record.channel_names;
        let secondary = self.registrations.secondary_approvals(user_id).await?;
        names.extend(
            secondary
                .into_iter()
                .filter(|a| a.status == ApprovalStatus::Approved)
                .map(|a| a.channel_name),
        );

        let mut seen = HashSet::new();
        let mut channels = Vec::new();
        for name in &names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            match self.lookup(name).await? {
                Some(entry) => {
                    if seen.insert(entry.channel_id.clone()) {
                        channels.push(ChannelIdentity {
                            channel_id: entry.channel_id,
                            display_name: entry.channel_name,
                            owning_user_id: user_id.to_string(),
                        });
                    }
                }
                None => {
                    debug!(user_id = %user_id, channel_name = %name, "Channel not in registry, skipped");
                }
            }
        }

        debug!(
            user_id = %user_id,
            requested = names.len(),
            resolved = channels.len(),
            split_percent = split_percent,
            "Channels resolved"
        );

        Ok(ResolvedChannels {
            split_percent,
            channels,
        })
    }

    /// Exact name first, then case-insensitive substring.
    async fn lookup(&self, name: &str) -> InsightsResult<Option<RegistryEntry>> {
        if let Some(entry) = self.registry.find_exact(name).await? {
            return Ok(Some(entry));
        }
        self.registry.find_fuzzy(name).await
    }
}

/// Collapse a resolution failure into the empty result, logging why.
pub(crate) fn recover(user_id: &str, result: InsightsResult<ResolvedChannels>) -> ResolvedChannels {
    match result {
        Ok(resolved) => resolved,
        Err(InsightsError::NotFound(what)) => {
            debug!(user_id = %user_id, missing = %what, "No registration on record");
            ResolvedChannels::empty()
        }
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Channel resolution failed");
            metrics::counter!("analytics.resolution_failures").increment(1);
            ResolvedChannels::empty()
        }
    }
}
