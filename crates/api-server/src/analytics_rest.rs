//! Creator analytics REST endpoints.

use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::rest::{bad_request, validation_error, ApiError, AppState, ErrorResponse};
use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use creator_analytics::aggregate;
use creator_core::numeric::{deserialize_split_percent, DEFAULT_SPLIT_PERCENT};
use creator_core::range::DateRange;
use creator_core::types::{AnalyticsAggregate, AnalyticsReport, DailyCounterRow, ResolvedChannels};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

/// Maximum accepted user identifier length.
const MAX_USER_ID_LEN: usize = 256;

/// Maximum rows accepted by the ad-hoc aggregation endpoint.
const MAX_AGGREGATE_ROWS: usize = 100_000;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQuery {
    /// First day, `YYYY-MM-DD` or RFC3339.
    pub start: Option<String>,
    /// Last day, inclusive.
    pub end: Option<String>,
    /// Restrict the report to one of the user's channels.
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChannelsQuery {
    /// Bypass the resolution cache and resolve again.
    pub refresh: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    #[serde(default)]
    pub rows: Vec<DailyCounterRow>,
    #[serde(
        default = "default_split_percent",
        deserialize_with = "deserialize_split_percent"
    )]
    pub split_percent: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn default_split_percent() -> f64 {
    DEFAULT_SPLIT_PERCENT
}

fn validate_user_id(user_id: &str) -> Result<(), ApiError> {
    if user_id.trim().is_empty() {
        return Err(bad_request("invalid_user_id", "user id must not be empty"));
    }
    if user_id.len() > MAX_USER_ID_LEN {
        return Err(bad_request(
            "invalid_user_id",
            "user id exceeds maximum length",
        ));
    }
    Ok(())
}

/// GET /v1/analytics/{user_id}: Dashboard report for a user.
#[utoipa::path(
    get,
    path = "/v1/analytics/{user_id}",
    tag = "Analytics",
    params(
        ("user_id" = String, Path, description = "Creator user identifier"),
        AnalyticsQuery,
    ),
    responses(
        (status = 200, description = "Aggregated analytics report", body = AnalyticsReport),
        (status = 400, description = "Invalid user id, query or date range", body = ErrorResponse),
    )
)]
pub async fn handle_analytics(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<AnalyticsQuery>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    validate_user_id(&user_id)?;

    let range = DateRange::parse(
        query.start.as_deref(),
        query.end.as_deref(),
        Utc::now().date_naive(),
        state.default_range_days,
        state.max_range_days,
    )
    .map_err(|e| {
        warn!(user_id = %user_id, error = %e, "Rejected analytics date range");
        validation_error("invalid_date_range", e)
    })?;

    let channel = query
        .channel
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let report = state.service.query(&user_id, range, channel).await;
    Ok(Json(report))
}

/// GET /v1/channels/{user_id}: Channels visible to a user and their split.
#[utoipa::path(
    get,
    path = "/v1/channels/{user_id}",
    tag = "Analytics",
    params(
        ("user_id" = String, Path, description = "Creator user identifier"),
        ChannelsQuery,
    ),
    responses(
        (status = 200, description = "Resolved channels", body = ResolvedChannels),
        (status = 400, description = "Invalid user id or query", body = ErrorResponse),
    )
)]
pub async fn handle_channels(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<ChannelsQuery>,
) -> Result<Json<ResolvedChannels>, ApiError> {
    validate_user_id(&user_id)?;
    let resolved = if query.refresh.unwrap_or(false) {
        info!(user_id = %user_id, "Channel resolution refresh requested");
        state.service.refresh_channels(&user_id).await
    } else {
        state.service.resolve_channels(&user_id).await
    };
    Ok(Json(resolved))
}

/// POST /v1/aggregate: Aggregate caller-supplied counter rows.
#[utoipa::path(
    post,
    path = "/v1/aggregate",
    tag = "Analytics",
    request_body = AggregateRequest,
    responses(
        (status = 200, description = "Zero-filled series and summary", body = AnalyticsAggregate),
        (status = 400, description = "Malformed body, too many rows or range too long", body = ErrorResponse),
    )
)]
pub async fn handle_aggregate(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AggregateRequest>,
) -> Result<Json<AnalyticsAggregate>, ApiError> {
    if request.rows.len() > MAX_AGGREGATE_ROWS {
        return Err(bad_request(
            "invalid_aggregate_request",
            format!("at most {} rows are accepted", MAX_AGGREGATE_ROWS),
        ));
    }
    let range = DateRange::new(request.start, request.end);
    if range.len_days() > u64::from(state.max_range_days) {
        return Err(bad_request(
            "invalid_date_range",
            format!(
                "Date range spans {} days, maximum is {}",
                range.len_days(),
                state.max_range_days
            ),
        ));
    }

    let result = aggregate(&request.rows, request.split_percent, range.start, range.end);
    info!(
        rows = request.rows.len(),
        days = result.daily_data.len(),
        "Ad-hoc aggregation served"
    );
    Ok(Json(result))
}
