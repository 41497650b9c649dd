//! ClickHouse-backed counters store for the `daily_channel_counters` table.

use crate::collaborators::CountersStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use clickhouse::Row;
use creator_core::config::ClickHouseConfig;
use creator_core::numeric::{coerce_amount, coerce_count};
use creator_core::types::DailyCounterRow;
use creator_core::{InsightsError, InsightsResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Raw row as selected. Counter columns are read as nullable floats so that
/// loosely typed source columns still decode.
#[derive(Debug, Row, Deserialize)]
struct CounterRecord {
    day: String,
    channel_id: String,
    views: Option<f64>,
    premium_views: Option<f64>,
    revenue: Option<f64>,
}

impl CounterRecord {
    fn into_row(self) -> Option<DailyCounterRow> {
        let date = match NaiveDate::parse_from_str(&self.day, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                warn!(day = %self.day, channel_id = %self.channel_id, error = %e, "Skipping counter row with bad date");
                return None;
            }
        };
        Some(DailyCounterRow {
            date,
            channel_id: self.channel_id,
            views: self.views.map(|v| coerce_count(&Value::from(v))).unwrap_or(0),
            premium_views: self
                .premium_views
                .map(|v| coerce_count(&Value::from(v)))
                .unwrap_or(0),
            revenue_raw: self
                .revenue
                .map(|v| coerce_amount(&Value::from(v)))
                .unwrap_or(0.0),
        })
    }
}

pub struct ClickHouseCountersStore {
    client: clickhouse::Client,
    table: String,
}

impl ClickHouseCountersStore {
    /// Connect and make sure the counters table exists.
    pub async fn new(config: &ClickHouseConfig) -> InsightsResult<Self> {
        let client = clickhouse::Client::default()
            .with_url(&config.url)
            .with_database(&config.database);

        let store = Self {
            client,
            table: config.counters_table.clone(),
        };
        store.ensure_schema().await?;

        info!(
            url = %config.url,
            database = %config.database,
            table = %store.table,
            "ClickHouse counters store initialized"
        );
        Ok(store)
    }

    async fn ensure_schema(&self) -> InsightsResult<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                date Date,
                channel_id String,
                views UInt64,
                premium_views UInt64,
                revenue Float64
            ) ENGINE = MergeTree()
            ORDER BY (channel_id, date)
            PARTITION BY toYYYYMM(date)",
            self.table
        );
        self.client
            .query(&ddl)
            .execute()
            .await
            .map_err(|e| InsightsError::Storage(format!("schema check failed: {}", e)))?;
        Ok(())
    }

    fn select_sql(&self) -> String {
        format!(
            "SELECT toString(date) AS day, channel_id, \
             toFloat64OrNull(toString(views)) AS views, \
             toFloat64OrNull(toString(premium_views)) AS premium_views, \
             toFloat64OrNull(toString(revenue)) AS revenue \
             FROM {} \
             WHERE has(?, channel_id) AND date >= toDate(?) AND date <= toDate(?)",
            self.table
        )
    }
}

#[async_trait]
impl CountersStore for ClickHouseCountersStore {
    async fn daily_counters(
        &self,
        channel_ids: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> InsightsResult<Vec<DailyCounterRow>> {
        let records = self
            .client
            .query(&self.select_sql())
            .bind(channel_ids)
            .bind(start.format("%Y-%m-%d").to_string())
            .bind(end.format("%Y-%m-%d").to_string())
            .fetch_all::<CounterRecord>()
            .await
            .map_err(|e| InsightsError::Storage(e.to_string()))?;

        let fetched = records.len();
        let rows: Vec<DailyCounterRow> = records
            .into_iter()
            .filter_map(CounterRecord::into_row)
            .collect();
        debug!(fetched = fetched, kept = rows.len(), "ClickHouse counters read");
        Ok(rows)
    }
}
