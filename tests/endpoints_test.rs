// Endpoint tests for the insights API boundary
// These verify:
// 1. /health stays open
// 2. Auth short-circuits before any fetch or aggregation work
// 3. Query validation answers 400 with the violated constraint
// 4. Missing PostHog credentials answer 503, distinct from upstream errors

mod test_helpers;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderValue, StatusCode};

use test_helpers::{bearer, test_server};

fn auth_value(role: &str) -> HeaderValue {
    HeaderValue::from_str(&bearer(role)).expect("valid header value")
}

#[tokio::test]
async fn test_health_is_open() {
    let server = test_server();
    let response = server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_analytics_requires_auth() {
    let server = test_server();
    let response = server.get("/api/properties/prop-1/analytics").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INSIGHTS_AUTH_DECLINED");
}

#[tokio::test]
async fn test_garbage_token_declined() {
    let server = test_server();
    let response = server
        .get("/api/properties/prop-1/insights")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer nonsense"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_buyer_tokens_are_forbidden() {
    let server = test_server();
    let response = server
        .get("/api/properties/prop-1/analytics")
        .add_header(AUTHORIZATION, auth_value("buyer"))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INSIGHTS_FORBIDDEN");
}

#[tokio::test]
async fn test_non_integer_days_rejected() {
    let server = test_server();
    let response = server
        .get("/api/properties/prop-1/analytics")
        .add_query_param("days", "abc")
        .add_header(AUTHORIZATION, auth_value("agent"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "days must be an integer");
}

#[tokio::test]
async fn test_out_of_range_days_rejected() {
    let server = test_server();

    for days in ["0", "-3", "400"] {
        let response = server
            .get("/api/properties/prop-1/insights")
            .add_query_param("days", days)
            .add_header(AUTHORIZATION, auth_value("admin"))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "days must be between 1 and 365");
    }
}

#[tokio::test]
async fn test_unconfigured_posthog_answers_503() {
    // The test config carries no PostHog credentials: a valid agent request
    // must reach the fetch step and come back as "configuration pending",
    // not as a 500 or an upstream error.
    let server = test_server();
    let response = server
        .get("/api/properties/prop-1/analytics")
        .add_header(AUTHORIZATION, auth_value("agent"))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "ANALYTICS_NOT_CONFIGURED");
}

#[tokio::test]
async fn test_insights_unconfigured_matches_analytics() {
    let server = test_server();
    let response = server
        .get("/api/properties/prop-1/insights")
        .add_query_param("days", "7")
        .add_header(AUTHORIZATION, auth_value("admin"))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "ANALYTICS_NOT_CONFIGURED");
}

#[tokio::test]
async fn test_security_headers_present() {
    let server = test_server();
    let response = server.get("/health").await;

    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-frame-options"), "DENY");
}
