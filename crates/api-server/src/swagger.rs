//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Creator Dashboard API",
        version = "0.1.0",
        description = "Creator analytics: resolved channels, zero-filled daily series and split-adjusted RPM.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Analytics", description = "Channel resolution and analytics aggregation"),
        (name = "Operations", description = "Health, readiness and liveness checks"),
    ),
    paths(
        // Analytics
        crate::analytics_rest::handle_analytics,
        crate::analytics_rest::handle_channels,
        crate::analytics_rest::handle_aggregate,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        creator_core::range::DateRange,
        creator_core::types::ApprovalStatus,
        creator_core::types::ChannelIdentity,
        creator_core::types::ResolvedChannels,
        creator_core::types::DailyCounterRow,
        creator_core::types::AggregatedDayRow,
        creator_core::types::SummaryMetrics,
        creator_core::types::AnalyticsAggregate,
        creator_core::types::ChannelTotals,
        creator_core::types::AnalyticsReport,
        crate::analytics_rest::AggregateRequest,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;
