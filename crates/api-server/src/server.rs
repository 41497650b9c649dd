//! API server: REST endpoints, Swagger UI and the Prometheus exporter.

use crate::analytics_rest;
use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use axum::routing::{get, post};
use axum::Router;
use creator_analytics::AnalyticsService;
use creator_core::config::AppConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the full HTTP router around `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Analytics
        .route("/v1/aggregate", post(analytics_rest::handle_aggregate))
        .route("/v1/analytics/:user_id", get(analytics_rest::handle_analytics))
        .route("/v1/channels/:user_id", get(analytics_rest::handle_channels))
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct ApiServer {
    config: AppConfig,
    service: Arc<AnalyticsService>,
}

impl ApiServer {
    pub fn new(config: AppConfig, service: Arc<AnalyticsService>) -> Self {
        Self { config, service }
    }

    /// Start the HTTP REST server. Runs until the listener fails.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let state = AppState {
            service: self.service.clone(),
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
            default_range_days: self.config.analytics.default_range_days,
            max_range_days: self.config.analytics.max_range_days,
        };

        let app = router(state);
        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Install the Prometheus recorder and its scrape listener.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        if !self.config.metrics.enabled {
            info!("Metrics exporter disabled");
            return Ok(());
        }

        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use creator_analytics::InMemoryBackend;
    use creator_cache::ResolutionCache;
    use tower::ServiceExt;

    fn state() -> AppState {
        let backend = InMemoryBackend::new();
        let service = AnalyticsService::new(
            backend.registrations.clone(),
            backend.registry.clone(),
            backend.counters.clone(),
            Arc::new(ResolutionCache::new(0, 0)),
        );
        AppState {
            service: Arc::new(service),
            node_id: "n1".to_string(),
            start_time: Instant::now(),
            default_range_days: 7,
            max_range_days: 31,
        }
    }

    #[tokio::test]
    async fn test_readiness_and_liveness() {
        for uri in ["/ready", "/live"] {
            let response = router(state())
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let response = router(state())
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"]["/v1/analytics/{user_id}"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_route_404() {
        let response = router(state())
            .oneshot(Request::builder().uri("/v1/payouts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
