use crate::numeric::{
    deserialize_amount, deserialize_count, deserialize_split_percent, DEFAULT_SPLIT_PERCENT,
};
use crate::range::DateRange;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_split_percent() -> f64 {
    DEFAULT_SPLIT_PERCENT
}

// ─── Registration ───────────────────────────────────────────────────────────

/// Review state of a registration or a channel grant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// A user's primary creator registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    pub user_id: String,
    pub status: ApprovalStatus,
    /// Share of gross revenue attributed to the user, in percent.
    #[serde(
        default = "default_split_percent",
        deserialize_with = "deserialize_split_percent"
    )]
    pub split_percent: f64,
    /// Channel names linked at registration time.
    #[serde(default)]
    pub channel_names: Vec<String>,
}

/// A channel granted to a user outside their primary registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryChannelApproval {
    pub user_id: String,
    pub channel_name: String,
    pub status: ApprovalStatus,
}

/// Maps a human-readable channel name to its analytics identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub channel_id: String,
    pub channel_name: String,
}

// ─── Channels ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelIdentity {
    pub channel_id: String,
    pub display_name: String,
    pub owning_user_id: String,
}

/// Channels visible to a user together with their revenue split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedChannels {
    pub split_percent: f64,
    pub channels: Vec<ChannelIdentity>,
}

impl ResolvedChannels {
    /// The result for users with no visible analytics.
    pub fn empty() -> Self {
        Self {
            split_percent: DEFAULT_SPLIT_PERCENT,
            channels: Vec::new(),
        }
    }

    pub fn channel_ids(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.channel_id.clone()).collect()
    }

    pub fn find(&self, channel_id: &str) -> Option<&ChannelIdentity> {
        self.channels.iter().find(|c| c.channel_id == channel_id)
    }
}

// ─── Counters ───────────────────────────────────────────────────────────────

/// Raw per-day, per-channel counters as written by ingestion.
///
/// Numeric fields decode leniently: missing, `null` or non-numeric values
/// are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyCounterRow {
    pub date: NaiveDate,
    pub channel_id: String,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub views: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub premium_views: u64,
    /// Gross revenue before any split.
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub revenue_raw: f64,
}

/// Counters for one calendar day summed across the selected channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedDayRow {
    pub date: NaiveDate,
    pub views: u64,
    pub premium_views: u64,
    pub revenue: f64,
    /// Unsplit revenue per thousand views for the day.
    pub rpm: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub total_views: u64,
    pub total_premium_views: u64,
    pub total_revenue: f64,
    /// Split-adjusted revenue per thousand views over the whole range.
    #[serde(rename = "averageRPM")]
    pub average_rpm: f64,
}

/// Output of the pure aggregation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsAggregate {
    pub daily_data: Vec<AggregatedDayRow>,
    pub summary: SummaryMetrics,
}

/// Range totals for a single contributing channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTotals {
    pub channel_id: String,
    pub display_name: String,
    pub views: u64,
    pub premium_views: u64,
    pub revenue: f64,
    pub rpm: f64,
}

/// Everything the dashboard renders for one analytics query.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub user_id: String,
    pub range: DateRange,
    pub split_percent: f64,
    pub channels: Vec<ChannelIdentity>,
    pub daily_data: Vec<AggregatedDayRow>,
    pub summary: SummaryMetrics,
    pub channel_totals: Vec<ChannelTotals>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_row_lenient_decoding() {
        let row: DailyCounterRow = serde_json::from_str(
            r#"{"date": "2024-01-01", "channelId": "c1", "views": "1000", "premiumViews": null, "revenueRaw": "n/a"}"#,
        )
        .unwrap();
        assert_eq!(row.views, 1000);
        assert_eq!(row.premium_views, 0);
        assert_eq!(row.revenue_raw, 0.0);

        let row: DailyCounterRow =
            serde_json::from_str(r#"{"date": "2024-01-02", "channelId": "c2"}"#).unwrap();
        assert_eq!(row.views, 0);
        assert_eq!(row.revenue_raw, 0.0);
    }

    #[test]
    fn test_registration_split_defaults() {
        let record: RegistrationRecord =
            serde_json::from_str(r#"{"userId": "u1", "status": "approved"}"#).unwrap();
        assert_eq!(record.split_percent, 100.0);
        assert!(record.channel_names.is_empty());

        let record: RegistrationRecord = serde_json::from_str(
            r#"{"userId": "u1", "status": "pending", "splitPercent": 250, "channelNames": ["A"]}"#,
        )
        .unwrap();
        assert_eq!(record.status, ApprovalStatus::Pending);
        assert_eq!(record.split_percent, 100.0);
        assert_eq!(record.channel_names, vec!["A".to_string()]);
    }

    #[test]
    fn test_summary_serializes_average_rpm_key() {
        let json = serde_json::to_value(SummaryMetrics::default()).unwrap();
        assert!(json.get("averageRPM").is_some());
        assert!(json.get("totalPremiumViews").is_some());
    }
}
