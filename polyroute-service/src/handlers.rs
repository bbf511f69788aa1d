//! HTTP request handlers for the polyline service.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use polyroute::polyline::DEFAULT_PRECISION;
use polyroute::{Coordinate, PolylineError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Query parameters for the decode endpoint.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DecodeQuery {
    /// Encoded polyline.
    pub polyline: String,
    /// Decimal places encoded in the polyline (default 5).
    pub precision: Option<u32>,
}

/// Response shape for decoded polylines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DecodeFormat {
    /// `{ coordinates, count }`
    #[default]
    Coordinates,
    /// GeoJSON `Feature` with a `LineString` geometry.
    Geojson,
}

/// Request body for `POST /decode`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DecodeRequest {
    /// Encoded polyline.
    pub polyline: String,
    /// Decimal places encoded in the polyline (default 5).
    #[serde(default)]
    pub precision: Option<u32>,
    /// Response shape (default `coordinates`).
    #[serde(default)]
    pub format: DecodeFormat,
}

/// Decoded coordinates.
#[derive(Debug, Serialize, ToSchema)]
pub struct DecodeResponse {
    /// Positions in GeoJSON order `[lon, lat]`.
    pub coordinates: Vec<Vec<f64>>,
    /// Number of coordinates.
    pub count: usize,
}

/// Request body for `POST /encode`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EncodeRequest {
    /// GeoJSON `LineString` or `MultiPoint` geometry.
    #[schema(value_type = Object)]
    pub geometry: geojson::Geometry,
    /// Decimal places to encode (default 5).
    #[serde(default)]
    pub precision: Option<u32>,
}

/// Encoded polyline.
#[derive(Debug, Serialize, ToSchema)]
pub struct EncodeResponse {
    /// Encoded polyline.
    pub polyline: String,
    /// Number of coordinates encoded.
    pub count: usize,
}

/// Query parameters for the route endpoint.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RouteQuery {
    /// Start point as `LAT,LON`.
    pub origin: String,
    /// End point as `LAT,LON`.
    pub destination: String,
}

/// A decoded driving route.
#[derive(Debug, Serialize, ToSchema)]
pub struct RouteResponse {
    /// Encoded overview polyline.
    pub polyline: String,
    /// Positions in GeoJSON order `[lon, lat]`.
    pub coordinates: Vec<Vec<f64>>,
    /// Route summary, usually the main road.
    pub summary: String,
    /// Total distance in meters.
    pub distance_meters: f64,
    /// Total duration in seconds.
    pub duration_seconds: f64,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Route cache statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Whether a directions client is configured.
    pub directions_enabled: bool,
    /// Number of routes in cache.
    pub cached_routes: u64,
    /// Cache hit count.
    pub cache_hits: u64,
    /// Cache miss count.
    pub cache_misses: u64,
    /// Cache hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}

fn positions(coords: &[Coordinate]) -> Vec<Vec<f64>> {
    coords.iter().map(|c| c.to_position()).collect()
}

/// Decode a polyline given as a query parameter.
///
/// # Returns
///
/// - `200 OK` with the decoded coordinates
/// - `400 Bad Request` if the polyline is malformed or the precision invalid
#[utoipa::path(
    get,
    path = "/decode",
    tag = "polyline",
    params(DecodeQuery),
    responses(
        (status = 200, description = "Decoded coordinates", body = DecodeResponse),
        (status = 400, description = "Malformed polyline", body = ErrorResponse)
    )
)]
pub async fn get_decode(Query(query): Query<DecodeQuery>) -> Response {
    let precision = query.precision.unwrap_or(DEFAULT_PRECISION);

    tracing::debug!(
        length = query.polyline.len(),
        precision = precision,
        "Decode query"
    );

    match polyroute::decode_with_precision(&query.polyline, precision) {
        Ok(coords) => (
            StatusCode::OK,
            Json(DecodeResponse {
                count: coords.len(),
                coordinates: positions(&coords),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Decode a polyline given in the request body.
///
/// With `"format": "geojson"` the response is a GeoJSON `Feature` with a
/// `LineString` geometry instead of the coordinate list.
#[utoipa::path(
    post,
    path = "/decode",
    tag = "polyline",
    request_body = DecodeRequest,
    responses(
        (status = 200, description = "Decoded coordinates or GeoJSON feature", body = DecodeResponse),
        (status = 400, description = "Malformed polyline", body = ErrorResponse)
    )
)]
pub async fn post_decode(Json(request): Json<DecodeRequest>) -> Response {
    let precision = request.precision.unwrap_or(DEFAULT_PRECISION);

    let coords = match polyroute::decode_with_precision(&request.polyline, precision) {
        Ok(coords) => coords,
        Err(e) => return error_response(e),
    };

    match request.format {
        DecodeFormat::Coordinates => (
            StatusCode::OK,
            Json(DecodeResponse {
                count: coords.len(),
                coordinates: positions(&coords),
            }),
        )
            .into_response(),
        DecodeFormat::Geojson => (
            StatusCode::OK,
            Json(polyroute::geojson::to_feature(&coords)),
        )
            .into_response(),
    }
}

/// Encode a GeoJSON `LineString` or `MultiPoint` geometry.
#[utoipa::path(
    post,
    path = "/encode",
    tag = "polyline",
    request_body = EncodeRequest,
    responses(
        (status = 200, description = "Encoded polyline", body = EncodeResponse),
        (status = 400, description = "Unsupported geometry or invalid coordinate", body = ErrorResponse)
    )
)]
pub async fn post_encode(Json(request): Json<EncodeRequest>) -> Response {
    let precision = request.precision.unwrap_or(DEFAULT_PRECISION);

    let result = polyroute::geojson::coordinates_from_geometry(&request.geometry).and_then(
        |coords| {
            polyroute::encode_with_precision(&coords, precision).map(|polyline| {
                EncodeResponse {
                    polyline,
                    count: coords.len(),
                }
            })
        },
    );

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Fetch a driving route from the directions service.
///
/// # Returns
///
/// - `200 OK` with the decoded route
/// - `400 Bad Request` if origin or destination is invalid
/// - `404 Not Found` if the service found no route
/// - `502 Bad Gateway` if the directions service failed
/// - `503 Service Unavailable` if no directions API key is configured
#[utoipa::path(
    get,
    path = "/route",
    tag = "directions",
    params(RouteQuery),
    responses(
        (status = 200, description = "Decoded route", body = RouteResponse),
        (status = 400, description = "Invalid origin or destination", body = ErrorResponse),
        (status = 404, description = "No route found", body = ErrorResponse),
        (status = 502, description = "Directions service failed", body = ErrorResponse),
        (status = 503, description = "Directions not configured", body = ErrorResponse)
    )
)]
pub async fn get_route(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RouteQuery>,
) -> Response {
    let (origin, destination) = match (
        polyroute::coord::parse_lat_lon(&query.origin),
        polyroute::coord::parse_lat_lon(&query.destination),
    ) {
        (Ok(origin), Ok(destination)) => (origin, destination),
        (Err(e), _) | (_, Err(e)) => return error_response(e),
    };

    if state.directions.is_none() {
        return error_response(PolylineError::MissingApiKey);
    }

    tracing::debug!(?origin, ?destination, "Route query");

    // The directions client blocks on HTTP
    let task_state = state.clone();
    let result = tokio::task::spawn_blocking(move || match &task_state.directions {
        Some(client) => client.route(origin, destination),
        None => Err(PolylineError::MissingApiKey),
    })
    .await;

    match result {
        Ok(Ok(route)) => {
            tracing::info!(
                points = route.coordinates.len(),
                distance_meters = route.distance_meters,
                "Route found"
            );
            (
                StatusCode::OK,
                Json(RouteResponse {
                    polyline: route.encoded.clone(),
                    coordinates: positions(&route.coordinates),
                    summary: route.summary.clone(),
                    distance_meters: route.distance_meters,
                    duration_seconds: route.duration_seconds,
                }),
            )
                .into_response()
        }
        Ok(Err(e)) => error_response(e),
        Err(e) => {
            tracing::error!(error = %e, "Route task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Route task failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Map a library error to an HTTP response.
fn error_response(e: PolylineError) -> Response {
    let status = match &e {
        e if e.is_malformed() => StatusCode::BAD_REQUEST,
        PolylineError::InvalidPrecision { .. }
        | PolylineError::InvalidCoordinate { .. }
        | PolylineError::UnsupportedGeometry { .. } => StatusCode::BAD_REQUEST,
        PolylineError::NoRoute => StatusCode::NOT_FOUND,
        PolylineError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };

    tracing::warn!(status = status.as_u16(), error = %e, "Request failed");

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get route cache statistics.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "system",
    responses((status = 200, description = "Route cache statistics", body = StatsResponse))
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state
        .directions
        .as_ref()
        .map(|client| client.cache_stats())
        .unwrap_or_default();

    Json(StatsResponse {
        directions_enabled: state.directions.is_some(),
        cached_routes: stats.entry_count,
        cache_hits: stats.hit_count,
        cache_misses: stats.miss_count,
        hit_rate: stats.hit_rate(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_request_deserialize() {
        let json = r#"{"polyline": "CC"}"#;
        let request: DecodeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.polyline, "CC");
        assert_eq!(request.precision, None);
        assert_eq!(request.format, DecodeFormat::Coordinates);

        let json = r#"{"polyline": "CC", "precision": 6, "format": "geojson"}"#;
        let request: DecodeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.precision, Some(6));
        assert_eq!(request.format, DecodeFormat::Geojson);
    }

    #[test]
    fn test_decode_response_serialize() {
        let response = DecodeResponse {
            coordinates: vec![vec![-120.2, 38.5]],
            count: 1,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("-120.2"));
        assert!(json.contains("\"count\":1"));
    }

    #[test]
    fn test_error_status_mapping() {
        let response = error_response(PolylineError::TruncatedValue { position: 0 });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_response(PolylineError::NoRoute);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = error_response(PolylineError::MissingApiKey);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = error_response(PolylineError::DirectionsFailed {
            status: "OVER_QUERY_LIMIT".to_string(),
            message: String::new(),
        });
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_health_response_serialize() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }
}
