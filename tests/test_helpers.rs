// Test helpers: event builders and a router wired like production

#![allow(dead_code)]

use axum_test::TestServer;
use uuid::Uuid;

use listing_insights_api::middleware::auth::mint_token;
use listing_insights_api::models::RawEvent;
use listing_insights_api::{api_router, AppState, Config};

pub const TEST_SECRET: &str = "test-secret";

/// A Monday morning, UTC.
pub const TS: &str = "2024-05-06T10:00:00+00:00";

pub fn event(name: &str, timestamp: &str, properties: serde_json::Value) -> RawEvent {
    serde_json::from_value(serde_json::json!({
        "event": name,
        "timestamp": timestamp,
        "properties": properties,
    }))
    .expect("valid test event")
}

pub fn pageview(timestamp: &str) -> RawEvent {
    event("pageview", timestamp, serde_json::json!({}))
}

pub fn session_start(session: &str, timestamp: &str) -> RawEvent {
    event(
        "session_start",
        timestamp,
        serde_json::json!({ "session_id": session }),
    )
}

pub fn session_end(session: &str, timestamp: &str, total_time: f64) -> RawEvent {
    event(
        "session_end",
        timestamp,
        serde_json::json!({ "session_id": session, "total_time": total_time }),
    )
}

pub fn scroll_milestone(session: &str, timestamp: &str, milestone: &str) -> RawEvent {
    event(
        "scroll_milestone",
        timestamp,
        serde_json::json!({ "session_id": session, "milestone": milestone }),
    )
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiration: 3600,
        posthog_host: "https://us.posthog.com".to_string(),
        // Left unset so the fetch path reports ConfigMissing (503)
        posthog_project_id: None,
        posthog_api_key: None,
    }
}

pub fn test_server() -> TestServer {
    let state = AppState::new(test_config());
    TestServer::new(api_router(state)).expect("failed to start test server")
}

pub fn bearer(role: &str) -> String {
    let token = mint_token(
        &Uuid::new_v4(),
        "dashboard@example.com",
        role,
        TEST_SECRET,
        3600,
    )
    .expect("failed to mint test token");
    format!("Bearer {}", token)
}
