//! Polyroute Service Library
//!
//! HTTP handlers, router and types for the polyline service.
//! This library is used by both the polyroute-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use polyroute::DirectionsClient;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Application state shared across handlers.
pub struct AppState {
    /// Directions client, `None` when no API key is configured.
    pub directions: Option<DirectionsClient>,
}

impl AppState {
    /// State without a directions client. `/route` answers 503.
    pub fn without_directions() -> Self {
        Self { directions: None }
    }
}

/// Build the API router with tracing and permissive CORS.
///
/// The Swagger UI is merged in by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/decode",
            get(handlers::get_decode).post(handlers::post_decode),
        )
        .route("/encode", post(handlers::post_encode))
        .route("/route", get(handlers::get_route))
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{
    DecodeFormat, DecodeQuery, DecodeRequest, DecodeResponse, EncodeRequest, EncodeResponse,
    ErrorResponse, HealthResponse, RouteQuery, RouteResponse, StatsResponse,
};
