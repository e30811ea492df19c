// Library root - router and state shared by the binary and tests

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use handlers::*;

use std::sync::Arc;

use axum::{routing::get, Router};

use services::PostHogClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub posthog: PostHogClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let posthog = PostHogClient::from_config(&config);
        Self {
            config: Arc::new(config),
            posthog,
        }
    }
}

/// Build the full router. Auth middleware covers everything except /health.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/properties/:id/analytics",
            get(handlers::get_property_analytics),
        )
        .route(
            "/api/properties/:id/insights",
            get(handlers::get_property_insights),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::security_headers::security_headers_middleware,
        ))
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
