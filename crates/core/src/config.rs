use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CREATOR_DASHBOARD__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Query limits for the analytics endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Window used when a request names neither bound.
    #[serde(default = "default_range_days")]
    pub default_range_days: u32,
    /// Longest inclusive range a single query may span.
    #[serde(default = "default_max_range_days")]
    pub max_range_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Seconds a resolved channel set stays cached. Zero disables the cache.
    #[serde(default = "default_resolution_ttl_secs")]
    pub resolution_ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Clickhouse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,
    /// JSON seed for the in-memory stores.
    #[serde(default)]
    pub seed_path: Option<String>,
    #[serde(default)]
    pub clickhouse: ClickHouseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClickHouseConfig {
    #[serde(default = "default_clickhouse_url")]
    pub url: String,
    #[serde(default = "default_clickhouse_db")]
    pub database: String,
    #[serde(default = "default_counters_table")]
    pub counters_table: String,
}

// Default functions
fn default_node_id() -> String {
    "dashboard-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_range_days() -> u32 {
    30
}
fn default_max_range_days() -> u32 {
    366
}
fn default_resolution_ttl_secs() -> u64 {
    60
}
fn default_max_entries() -> usize {
    10_000
}
fn default_storage_backend() -> StorageBackend {
    StorageBackend::Memory
}
fn default_clickhouse_url() -> String {
    "http://localhost:8123".to_string()
}
fn default_clickhouse_db() -> String {
    "creator_dashboard".to_string()
}
fn default_counters_table() -> String {
    "daily_channel_counters".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_range_days: default_range_days(),
            max_range_days: default_max_range_days(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            resolution_ttl_secs: default_resolution_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            seed_path: None,
            clickhouse: ClickHouseConfig::default(),
        }
    }
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            url: default_clickhouse_url(),
            database: default_clickhouse_db(),
            counters_table: default_counters_table(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            analytics: AnalyticsConfig::default(),
            cache: CacheConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CREATOR_DASHBOARD")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.http_port, 8080);
        assert_eq!(config.analytics.default_range_days, 30);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.storage.seed_path.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"api": {"http_port": 9000}, "storage": {"backend": "clickhouse"}}"#,
        )
        .unwrap();
        assert_eq!(config.api.http_port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.storage.backend, StorageBackend::Clickhouse);
        assert_eq!(
            config.storage.clickhouse.counters_table,
            "daily_channel_counters"
        );
        assert_eq!(config.cache.resolution_ttl_secs, 60);
    }
}
