//! Creator Dashboard: analytics backend for creator revenue dashboards.
//!
//! Main entry point that wires the stores, the analytics service and the
//! HTTP server.

use clap::{Parser, ValueEnum};
use creator_analytics::{
    AnalyticsService, ClickHouseCountersStore, CountersStore, InMemoryBackend, SeedData,
};
use creator_api::ApiServer;
use creator_cache::ResolutionCache;
use creator_core::config::{AppConfig, StorageBackend};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StorageArg {
    Memory,
    Clickhouse,
}

impl From<StorageArg> for StorageBackend {
    fn from(arg: StorageArg) -> Self {
        match arg {
            StorageArg::Memory => StorageBackend::Memory,
            StorageArg::Clickhouse => StorageBackend::Clickhouse,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "creator-dashboard")]
#[command(about = "Creator analytics dashboard backend")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "CREATOR_DASHBOARD__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "CREATOR_DASHBOARD__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// JSON seed for the in-memory stores (overrides config)
    #[arg(long)]
    seed: Option<String>,

    /// Counters backend (overrides config)
    #[arg(long, value_enum)]
    storage: Option<StorageArg>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "creator_dashboard=info,creator_analytics=info,creator_api=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Creator Dashboard starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(seed) = cli.seed {
        config.storage.seed_path = Some(seed);
    }
    if let Some(storage) = cli.storage {
        config.storage.backend = storage.into();
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        backend = ?config.storage.backend,
        "Configuration loaded"
    );

    // Registrations and the channel registry always come from the in-memory
    // stores; only counters can be served from ClickHouse.
    let backend = match &config.storage.seed_path {
        Some(path) => InMemoryBackend::from_seed(SeedData::from_path(path)?),
        None => {
            warn!("No seed configured, starting with empty stores");
            InMemoryBackend::new()
        }
    };

    let counters: Arc<dyn CountersStore> = match config.storage.backend {
        StorageBackend::Memory => backend.counters.clone(),
        StorageBackend::Clickhouse => {
            Arc::new(ClickHouseCountersStore::new(&config.storage.clickhouse).await?)
        }
    };

    let cache = Arc::new(ResolutionCache::new(
        config.cache.resolution_ttl_secs,
        config.cache.max_entries,
    ));

    let service = Arc::new(AnalyticsService::new(
        backend.registrations.clone(),
        backend.registry.clone(),
        counters,
        cache.clone(),
    ));

    let api_server = ApiServer::new(config.clone(), service);

    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    // Spawn cache maintenance task
    if cache.is_enabled() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                let evicted = cache.evict_expired();
                if evicted > 0 {
                    info!(evicted = evicted, "Expired channel resolutions evicted");
                }
            }
        });
    }

    info!("Creator Dashboard is ready to serve traffic");

    // Blocks until shutdown
    api_server.start_http().await?;

    Ok(())
}
