//! Nearby API - authentication session server
//!
//! HTTP surface for end-user and administrator login, logout, and access
//! token refresh.
//!
//! Author: hephaex@gmail.com

pub mod audit;
pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

#[cfg(feature = "test-utils")]
pub use testing::create_router_for_testing;

use crate::handlers::health;
use crate::middleware::{metrics_middleware, security_headers_middleware};
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Build the application router over `state`
pub fn create_router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::prometheus_metrics))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .nest("/v1/auth", routes::auth_routes(state.clone()))
        .layer(axum_middleware::from_fn(metrics_middleware))
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(server.max_body_size));

    if let Some(cors) = cors_layer(&server.cors_origins) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

/// CORS for the configured origins; none configured means no CORS headers
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}
