//! Driving directions client.
//!
//! This module fetches a route between two points from a Google-compatible
//! directions API and decodes its overview polyline. It is only available when
//! the `directions` feature is enabled.
//!
//! The request is `GET {base_url}?origin=LAT,LON&destination=LAT,LON&key=KEY`;
//! the encoded route lives at `routes[0].overview_polyline.points` in the JSON
//! response.
//!
//! ```ignore
//! use polyroute::{Coordinate, directions::DirectionsClientBuilder};
//!
//! let client = DirectionsClientBuilder::new("my-api-key")
//!     .cache_size(500)
//!     .build()?;
//!
//! let route = client.route(
//!     Coordinate::new(19.4326, -99.1332),
//!     Coordinate::new(19.4270, -99.1677),
//! )?;
//! println!("{} points, {:.1} km", route.coordinates.len(), route.distance_meters / 1000.0);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;
use crate::error::{PolylineError, Result};
use crate::polyline::decode;

/// Default directions endpoint.
pub const DEFAULT_BASE_URL: &str = "https://maps.gomaps.pro/maps/api/directions/json";

/// Default timeout for HTTP requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of routes kept in the cache.
const DEFAULT_CACHE_SIZE: u64 = 100;

/// Status reported when the service returns an undecodable polyline.
pub const INVALID_POLYLINE_STATUS: &str = "INVALID_POLYLINE";

/// Cache key: origin and destination rounded to polyline precision.
type RouteKey = (i64, i64, i64, i64);

/// Configuration for the directions service.
#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    /// Endpoint URL, without query string.
    pub base_url: String,
    /// API key sent as the `key` query parameter.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Number of retry attempts on transport or server errors.
    pub max_retries: u32,
}

impl DirectionsConfig {
    /// Create a configuration for the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: 3,
        }
    }
}

/// Raw directions API response.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    /// API status, e.g. `OK` or `ZERO_RESULTS`.
    #[serde(default)]
    pub status: String,
    /// Human-readable error detail for non-OK statuses.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

/// One route of a directions response.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsRoute {
    /// Short description, usually the main road.
    #[serde(default)]
    pub summary: String,
    /// Simplified geometry of the whole route.
    pub overview_polyline: OverviewPolyline,
    /// Legs between waypoints.
    #[serde(default)]
    pub legs: Vec<DirectionsLeg>,
}

/// Encoded overview geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct OverviewPolyline {
    /// Encoded polyline string.
    pub points: String,
}

/// One leg of a route.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsLeg {
    /// Leg distance in meters.
    pub distance: Option<TextValue>,
    /// Leg duration in seconds.
    pub duration: Option<TextValue>,
}

/// A measured quantity with its display text.
#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    /// Display text, e.g. "4.2 km".
    #[serde(default)]
    pub text: String,
    /// Raw value in meters or seconds.
    pub value: f64,
}

/// A decoded driving route.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    /// Encoded overview polyline as returned by the service.
    pub encoded: String,
    /// Decoded overview coordinates.
    pub coordinates: Vec<Coordinate>,
    /// Route summary.
    pub summary: String,
    /// Total distance over all legs, in meters.
    pub distance_meters: f64,
    /// Total duration over all legs, in seconds.
    pub duration_seconds: f64,
}

impl DirectionsResponse {
    /// Check the API status and return the first route.
    ///
    /// # Errors
    ///
    /// - [`PolylineError::NoRoute`] for `ZERO_RESULTS` or an empty route list
    /// - [`PolylineError::DirectionsFailed`] for any other non-OK status
    pub fn first_route(self) -> Result<DirectionsRoute> {
        match self.status.as_str() {
            "" | "OK" => {}
            "ZERO_RESULTS" => return Err(PolylineError::NoRoute),
            status => {
                return Err(PolylineError::DirectionsFailed {
                    status: status.to_string(),
                    message: self.error_message.unwrap_or_default(),
                })
            }
        }

        self.routes.into_iter().next().ok_or(PolylineError::NoRoute)
    }

    /// Decode the first route into a [`Route`].
    ///
    /// # Errors
    ///
    /// Same as [`DirectionsResponse::first_route`]. A route whose polyline
    /// cannot be decoded is a [`PolylineError::DirectionsFailed`] with status
    /// `INVALID_POLYLINE`, since the fault lies with the service.
    pub fn into_route(self) -> Result<Route> {
        let route = self.first_route()?;
        let coordinates = decode(&route.overview_polyline.points).map_err(|e| {
            PolylineError::DirectionsFailed {
                status: INVALID_POLYLINE_STATUS.to_string(),
                message: e.to_string(),
            }
        })?;

        let distance_meters = route
            .legs
            .iter()
            .filter_map(|leg| leg.distance.as_ref())
            .map(|d| d.value)
            .sum();
        let duration_seconds = route
            .legs
            .iter()
            .filter_map(|leg| leg.duration.as_ref())
            .map(|d| d.value)
            .sum();

        Ok(Route {
            encoded: route.overview_polyline.points,
            coordinates,
            summary: route.summary,
            distance_meters,
            duration_seconds,
        })
    }
}

/// Extract `routes[0].overview_polyline.points` from a response body.
///
/// # Errors
///
/// Returns an error if the body is not a directions response, the status is
/// not OK, or there is no route.
pub fn extract_overview_polyline(body: &str) -> Result<String> {
    let response: DirectionsResponse = serde_json::from_str(body)?;
    Ok(response.first_route()?.overview_polyline.points)
}

/// Statistics about route cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of routes currently in the cache.
    pub entry_count: u64,
    /// Number of cache hits (routes served from cache).
    pub hit_count: u64,
    /// Number of cache misses (routes fetched from the service).
    pub miss_count: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// Outcome of a failed attempt.
enum Attempt {
    /// Worth trying again (transport error, 5xx, `UNKNOWN_ERROR`).
    Retry(PolylineError),
    /// Final answer from the service.
    Fail(PolylineError),
}

/// Blocking directions client with an LRU route cache.
///
/// Safe to share between threads; wrap it in an `Arc` to use it from several
/// request handlers.
pub struct DirectionsClient {
    client: Client,
    config: DirectionsConfig,
    /// LRU cache of decoded routes, keyed by rounded origin/destination.
    route_cache: Cache<RouteKey, Arc<Route>>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl DirectionsClient {
    /// Create a builder using the given API key.
    pub fn builder(api_key: impl Into<String>) -> DirectionsClientBuilder {
        DirectionsClientBuilder::new(api_key)
    }

    /// Fetch and decode the driving route between two points.
    ///
    /// Routes are cached by origin and destination rounded to 5 decimal
    /// places, so repeated requests for the same trip do not hit the network.
    ///
    /// # Errors
    ///
    /// Returns an error if every attempt fails, the service reports a
    /// non-OK status, there is no route, or the returned polyline is
    /// malformed.
    pub fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<Arc<Route>> {
        let key = route_key(origin, destination);

        if let Some(route) = self.route_cache.get(&key) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(?origin, ?destination, "Route cache hit");
            return Ok(route);
        }
        self.miss_count.fetch_add(1, Ordering::Relaxed);

        let route = Arc::new(self.fetch_with_retries(origin, destination)?);
        self.route_cache.insert(key, route.clone());

        Ok(route)
    }

    fn fetch_with_retries(&self, origin: Coordinate, destination: Coordinate) -> Result<Route> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                std::thread::sleep(Duration::from_millis(500 * attempt as u64));
            }

            tracing::debug!(?origin, ?destination, attempt, "Requesting directions");

            match self.fetch(origin, destination) {
                Ok(route) => return Ok(route),
                Err(Attempt::Fail(e)) => return Err(e),
                Err(Attempt::Retry(e)) => {
                    tracing::warn!(attempt, error = %e, "Directions request failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| PolylineError::DirectionsFailed {
            status: "UNKNOWN_ERROR".to_string(),
            message: "Unknown error".to_string(),
        }))
    }

    fn fetch(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> std::result::Result<Route, Attempt> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("origin", format_lat_lon(origin)),
                ("destination", format_lat_lon(destination)),
                ("key", self.config.api_key.clone()),
            ])
            .send()
            .map_err(|e| Attempt::Retry(e.into()))?;

        let status = response.status();
        let body = response.text().map_err(|e| Attempt::Retry(e.into()))?;

        if status.is_server_error() {
            return Err(Attempt::Retry(PolylineError::DirectionsFailed {
                status: format!("HTTP {}", status.as_u16()),
                message: body,
            }));
        }
        if !status.is_success() {
            // Prefer the structured API error if the body carries one.
            let message = serde_json::from_str::<DirectionsResponse>(&body)
                .ok()
                .and_then(|r| r.error_message)
                .unwrap_or(body);
            return Err(Attempt::Fail(PolylineError::DirectionsFailed {
                status: format!("HTTP {}", status.as_u16()),
                message,
            }));
        }

        let parsed: DirectionsResponse =
            serde_json::from_str(&body).map_err(|e| Attempt::Fail(e.into()))?;

        if parsed.status == "UNKNOWN_ERROR" {
            return Err(Attempt::Retry(PolylineError::DirectionsFailed {
                status: parsed.status,
                message: parsed.error_message.unwrap_or_default(),
            }));
        }

        parsed.into_route().map_err(Attempt::Fail)
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.route_cache.entry_count(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }

    /// Get the maximum cache size.
    pub fn cache_capacity(&self) -> u64 {
        self.route_cache.policy().max_capacity().unwrap_or(0)
    }

    /// Endpoint the client talks to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Clear all routes from the cache.
    pub fn clear_cache(&self) {
        self.route_cache.invalidate_all();
    }
}

/// Builder for creating [`DirectionsClient`] with custom configuration.
///
/// # Example
///
/// ```ignore
/// use polyroute::directions::DirectionsClientBuilder;
///
/// let client = DirectionsClientBuilder::new("my-api-key")
///     .base_url("https://maps.googleapis.com/maps/api/directions/json")
///     .max_retries(1)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct DirectionsClientBuilder {
    config: DirectionsConfig,
    cache_size: u64,
}

impl DirectionsClientBuilder {
    /// Create a new builder with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config: DirectionsConfig::new(api_key),
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `POLYROUTE_DIRECTIONS_API_KEY` | Directions API key | Required |
    /// | `POLYROUTE_DIRECTIONS_URL` | Directions endpoint | gomaps.pro |
    /// | `POLYROUTE_DIRECTIONS_TIMEOUT` | Request timeout in seconds | 30 |
    /// | `POLYROUTE_CACHE_SIZE` | Maximum routes in cache | 100 |
    ///
    /// # Errors
    ///
    /// Returns [`PolylineError::MissingApiKey`] if the API key is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("POLYROUTE_DIRECTIONS_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(PolylineError::MissingApiKey)?;

        let mut builder = Self::new(api_key);

        if let Ok(url) = std::env::var("POLYROUTE_DIRECTIONS_URL") {
            builder = builder.base_url(url);
        }
        if let Some(timeout) = std::env::var("POLYROUTE_DIRECTIONS_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            builder = builder.timeout_secs(timeout);
        }

        let cache_size: u64 = std::env::var("POLYROUTE_CACHE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CACHE_SIZE);

        Ok(builder.cache_size(cache_size))
    }

    /// Set the directions endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set the maximum number of retry attempts.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the maximum number of routes to keep in cache.
    ///
    /// Default is 100 routes.
    pub fn cache_size(mut self, size: u64) -> Self {
        self.cache_size = size;
        self
    }

    /// Build the [`DirectionsClient`].
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot be
    /// created (e.g., due to TLS initialization failure).
    pub fn build(self) -> Result<DirectionsClient> {
        if self.config.api_key.is_empty() {
            return Err(PolylineError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(|e| PolylineError::ClientBuild {
                reason: e.to_string(),
            })?;

        Ok(DirectionsClient {
            client,
            config: self.config,
            route_cache: Cache::builder().max_capacity(self.cache_size).build(),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        })
    }
}

fn format_lat_lon(c: Coordinate) -> String {
    format!("{},{}", c.lat, c.lon)
}

fn route_key(origin: Coordinate, destination: Coordinate) -> RouteKey {
    let q = |v: f64| (v * 1e5).round() as i64;
    (
        q(origin.lat),
        q(origin.lon),
        q(destination.lat),
        q(destination.lon),
    )
}
