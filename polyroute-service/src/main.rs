//! Polyroute Service - HTTP microservice for encoded polylines.
//!
//! Decodes and encodes polylines, and fetches decoded driving routes from a
//! Google-compatible directions API.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `POLYROUTE_PORT` | HTTP server port | 8080 |
//! | `POLYROUTE_DIRECTIONS_API_KEY` | Directions API key, enables `/route` | None |
//! | `POLYROUTE_DIRECTIONS_URL` | Directions endpoint | gomaps.pro |
//! | `POLYROUTE_DIRECTIONS_TIMEOUT` | Request timeout in seconds | 30 |
//! | `POLYROUTE_CACHE_SIZE` | Maximum routes in cache | 100 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /decode?polyline=...&precision=5` - Decode a polyline
//! - `POST /decode` - Decode a polyline, optionally as a GeoJSON feature
//! - `POST /encode` - Encode a GeoJSON LineString or MultiPoint
//! - `GET /route?origin=LAT,LON&destination=LAT,LON` - Fetch a decoded route
//! - `GET /health` - Health check
//! - `GET /stats` - Route cache statistics
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use polyroute::DirectionsClientBuilder;
use polyroute_service::{handlers, router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the polyroute service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Polyroute Service",
        version = "0.1.0",
        description = "REST API for decoding and encoding polylines and fetching driving routes.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "Pedro Sanz Martinez", url = "https://github.com/pedrosanzmtz/polyroute")
    ),
    paths(
        handlers::get_decode,
        handlers::post_decode,
        handlers::post_encode,
        handlers::get_route,
        handlers::health_check,
        handlers::get_stats,
    ),
    components(
        schemas(
            handlers::DecodeQuery,
            handlers::DecodeFormat,
            handlers::DecodeRequest,
            handlers::DecodeResponse,
            handlers::EncodeRequest,
            handlers::EncodeResponse,
            handlers::RouteQuery,
            handlers::RouteResponse,
            handlers::ErrorResponse,
            handlers::HealthResponse,
            handlers::StatsResponse,
        )
    ),
    tags(
        (name = "polyline", description = "Polyline decode and encode endpoints"),
        (name = "directions", description = "Driving route endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polyroute_service=info,polyroute=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("POLYROUTE_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    // The blocking HTTP client owns a runtime, build it off the async threads
    let directions = tokio::task::spawn_blocking(|| {
        DirectionsClientBuilder::from_env().and_then(|builder| builder.build())
    })
    .await?;

    let directions = match directions {
        Ok(client) => {
            tracing::info!(
                base_url = client.base_url(),
                cache_capacity = client.cache_capacity(),
                "Directions enabled"
            );
            Some(client)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Directions disabled, /route will answer 503");
            None
        }
    };

    tracing::info!(
        port = port,
        directions = directions.is_some(),
        "Starting polyroute service"
    );

    let state = Arc::new(AppState { directions });

    let app = router(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
