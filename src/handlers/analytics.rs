//! Property analytics endpoints.
//!
//! Flow per request: validate query params, fetch the property's events from
//! PostHog for the requested window, run the pure aggregator, return JSON.
//! Auth happens earlier in the middleware stack; fetch failures map to
//! distinct status codes here so the dashboard can tell "not configured yet"
//! from "provider is down".

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::RawEvent;
use crate::services::{
    aggregate_basic, aggregate_insights, BasicMetrics, FetchError, PropertyInsights,
};
use crate::AppState;

const SOURCE: &str = "posthog";
const DEFAULT_DAYS: &str = "30";
const MAX_WINDOW_DAYS: i64 = 365;

#[derive(Deserialize)]
pub struct AnalyticsQuery {
    /// Window length in days; arrives as a string from the dashboard client.
    pub days: Option<String>,
    #[serde(rename = "includeEvents")]
    pub include_events: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start_date: String,
    pub end_date: String,
    pub days: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse<T> {
    pub success: bool,
    pub data: T,
    /// Raw events, echoed only when includeEvents=true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<RawEvent>>,
    pub period: Period,
    pub source: &'static str,
}

pub async fn get_property_analytics(
    Path(property_id): Path<String>,
    Query(query): Query<AnalyticsQuery>,
    State(state): State<AppState>,
) -> Result<Json<MetricsResponse<BasicMetrics>>, (StatusCode, Json<serde_json::Value>)> {
    let days = parse_days(query.days.as_deref())?;
    let (start, end) = window(days);

    let events = state
        .posthog
        .fetch_property_events(&property_id, start, end)
        .await
        .map_err(fetch_failure)?;

    Ok(Json(MetricsResponse {
        success: true,
        data: aggregate_basic(&events),
        events: None,
        period: period(start, end, days),
        source: SOURCE,
    }))
}

pub async fn get_property_insights(
    Path(property_id): Path<String>,
    Query(query): Query<AnalyticsQuery>,
    State(state): State<AppState>,
) -> Result<Json<MetricsResponse<PropertyInsights>>, (StatusCode, Json<serde_json::Value>)> {
    let days = parse_days(query.days.as_deref())?;
    let (start, end) = window(days);

    let events = state
        .posthog
        .fetch_property_events(&property_id, start, end)
        .await
        .map_err(fetch_failure)?;

    let data = aggregate_insights(&events);
    let echoed = if query.include_events.unwrap_or(false) {
        Some(events)
    } else {
        None
    };

    Ok(Json(MetricsResponse {
        success: true,
        data,
        events: echoed,
        period: period(start, end, days),
        source: SOURCE,
    }))
}

/// Parse and validate the days query param. Defaults to "30".
fn parse_days(raw: Option<&str>) -> Result<i64, (StatusCode, Json<serde_json::Value>)> {
    let raw = raw.unwrap_or(DEFAULT_DAYS).trim();
    let days: i64 = raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": "days must be an integer"
            })),
        )
    })?;

    if !(1..=MAX_WINDOW_DAYS).contains(&days) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": format!("days must be between 1 and {}", MAX_WINDOW_DAYS)
            })),
        ));
    }

    Ok(days)
}

fn window(days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = Utc::now();
    (end - Duration::days(days), end)
}

fn period(start: DateTime<Utc>, end: DateTime<Utc>, days: i64) -> Period {
    Period {
        start_date: start.to_rfc3339(),
        end_date: end.to_rfc3339(),
        days,
    }
}

fn fetch_failure(error: FetchError) -> (StatusCode, Json<serde_json::Value>) {
    match error {
        FetchError::ConfigMissing => {
            // Expected until the deployment sets PostHog credentials; the
            // dashboard renders this as "configuration pending".
            tracing::warn!("Analytics requested but PostHog is not configured");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "success": false,
                    "code": "ANALYTICS_NOT_CONFIGURED",
                    "error": "Analytics provider is not configured"
                })),
            )
        }
        FetchError::UpstreamStatus(status) => {
            tracing::error!("PostHog returned status {}", status);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "success": false,
                    "code": "ANALYTICS_UPSTREAM_ERROR",
                    "error": format!("Analytics provider returned status {}", status)
                })),
            )
        }
        FetchError::Transport(e) => {
            tracing::error!("PostHog request failed: {:?}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "success": false,
                    "code": "ANALYTICS_UPSTREAM_ERROR",
                    "error": "Analytics provider is unreachable"
                })),
            )
        }
    }
}
