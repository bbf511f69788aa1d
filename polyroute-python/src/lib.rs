//! Python bindings for the polyroute encoded polyline library.

#![allow(clippy::useless_conversion)]

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

// Use fully qualified path to avoid collision with the Python module name
use ::polyroute as polyroute_lib;
use polyroute_lib::{Coordinate, PolylineError};

fn to_py_err(e: PolylineError) -> PyErr {
    match e {
        PolylineError::InvalidPrecision { .. }
        | PolylineError::InvalidCoordinate { .. }
        | PolylineError::UnsupportedGeometry { .. } => PyValueError::new_err(e.to_string()),
        e if e.is_malformed() => PyValueError::new_err(e.to_string()),
        e => PyRuntimeError::new_err(e.to_string()),
    }
}

fn to_tuples(coords: &[Coordinate]) -> Vec<(f64, f64)> {
    coords.iter().map(|c| (c.lon, c.lat)).collect()
}

/// Decode an encoded polyline.
///
/// Args:
///     polyline: Encoded polyline string.
///     precision: Decimal places encoded in the polyline (default: 5).
///
/// Returns:
///     List of (lon, lat) tuples, GeoJSON order.
///
/// Raises:
///     ValueError: If the polyline is malformed or the precision invalid.
///
/// Example:
///     >>> decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@")
///     [(-120.2, 38.5), (-120.95, 40.7), (-126.453, 43.252)]
#[pyfunction]
#[pyo3(signature = (polyline, precision=5))]
fn decode(polyline: &str, precision: u32) -> PyResult<Vec<(f64, f64)>> {
    polyroute_lib::decode_with_precision(polyline, precision)
        .map(|coords| to_tuples(&coords))
        .map_err(to_py_err)
}

/// Encode coordinates as a polyline.
///
/// Args:
///     coords: Sequence of (lon, lat) pairs, GeoJSON order.
///     precision: Decimal places to keep (default: 5).
///
/// Returns:
///     The encoded polyline string.
///
/// Raises:
///     ValueError: If a coordinate is out of range or the precision invalid.
#[pyfunction]
#[pyo3(signature = (coords, precision=5))]
fn encode(coords: Vec<(f64, f64)>, precision: u32) -> PyResult<String> {
    let coords: Vec<Coordinate> = coords
        .into_iter()
        .map(|(lon, lat)| Coordinate::from_lon_lat(lon, lat))
        .collect();
    polyroute_lib::encode_with_precision(&coords, precision).map_err(to_py_err)
}

/// Cache statistics for the directions client.
#[pyclass]
#[derive(Clone)]
struct CacheStats {
    /// Number of routes currently in the cache.
    #[pyo3(get)]
    entry_count: u64,
    /// Number of cache hits.
    #[pyo3(get)]
    hit_count: u64,
    /// Number of cache misses.
    #[pyo3(get)]
    miss_count: u64,
}

#[pymethods]
impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0).
    #[getter]
    fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "CacheStats(entry_count={}, hit_count={}, miss_count={}, hit_rate={:.2}%)",
            self.entry_count,
            self.hit_count,
            self.miss_count,
            self.hit_rate() * 100.0
        )
    }
}

/// A decoded driving route.
#[pyclass]
#[derive(Clone)]
struct Route {
    /// Encoded overview polyline.
    #[pyo3(get)]
    polyline: String,
    /// List of (lon, lat) tuples.
    #[pyo3(get)]
    coordinates: Vec<(f64, f64)>,
    /// Route summary, usually the main road.
    #[pyo3(get)]
    summary: String,
    /// Total distance in meters.
    #[pyo3(get)]
    distance_meters: f64,
    /// Total duration in seconds.
    #[pyo3(get)]
    duration_seconds: f64,
}

#[pymethods]
impl Route {
    fn __len__(&self) -> usize {
        self.coordinates.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Route(points={}, summary={:?}, distance_meters={}, duration_seconds={})",
            self.coordinates.len(),
            self.summary,
            self.distance_meters,
            self.duration_seconds
        )
    }
}

/// Client for a Google-compatible directions API, with route caching.
///
/// Example:
///     >>> client = DirectionsClient("my-api-key")
///     >>> route = client.route((19.4326, -99.1332), (20.6597, -103.3496))
///     >>> print(route.summary, len(route.coordinates))
#[pyclass]
struct DirectionsClient {
    inner: polyroute_lib::DirectionsClient,
}

#[pymethods]
impl DirectionsClient {
    /// Create a new directions client.
    ///
    /// Args:
    ///     api_key: Directions API key.
    ///     base_url: Directions endpoint (default: gomaps.pro).
    ///     cache_size: Maximum number of routes to keep in cache (default: 100).
    ///
    /// Raises:
    ///     RuntimeError: If the API key is empty or the HTTP client fails to build.
    #[new]
    #[pyo3(signature = (api_key, base_url=None, cache_size=100))]
    fn new(api_key: &str, base_url: Option<String>, cache_size: u64) -> PyResult<Self> {
        let mut builder =
            polyroute_lib::DirectionsClientBuilder::new(api_key).cache_size(cache_size);
        if let Some(url) = base_url {
            builder = builder.base_url(url);
        }

        Ok(DirectionsClient {
            inner: builder.build().map_err(to_py_err)?,
        })
    }

    /// Fetch the driving route between two points.
    ///
    /// Args:
    ///     origin: (lat, lon) tuple.
    ///     destination: (lat, lon) tuple.
    ///
    /// Returns:
    ///     A Route with the decoded overview polyline.
    ///
    /// Raises:
    ///     ValueError: If a point is out of range.
    ///     RuntimeError: If the request fails, no route exists, or the service
    ///         returns an undecodable polyline.
    fn route(
        &self,
        py: Python<'_>,
        origin: (f64, f64),
        destination: (f64, f64),
    ) -> PyResult<Route> {
        let origin = Coordinate::new(origin.0, origin.1);
        let destination = Coordinate::new(destination.0, destination.1);
        if !origin.is_valid() || !destination.is_valid() {
            return Err(PyValueError::new_err(
                "origin and destination must be valid (lat, lon)",
            ));
        }

        let route = py
            .allow_threads(|| self.inner.route(origin, destination))
            .map_err(to_py_err)?;

        Ok(Route {
            polyline: route.encoded.clone(),
            coordinates: to_tuples(&route.coordinates),
            summary: route.summary.clone(),
            distance_meters: route.distance_meters,
            duration_seconds: route.duration_seconds,
        })
    }

    /// Get cache statistics.
    fn cache_stats(&self) -> CacheStats {
        let stats = self.inner.cache_stats();
        CacheStats {
            entry_count: stats.entry_count,
            hit_count: stats.hit_count,
            miss_count: stats.miss_count,
        }
    }

    /// Drop every cached route.
    fn clear_cache(&self) {
        self.inner.clear_cache();
    }

    fn __repr__(&self) -> String {
        format!(
            "DirectionsClient(base_url={:?}, cache_capacity={})",
            self.inner.base_url(),
            self.inner.cache_capacity()
        )
    }
}

/// Encoded polyline codec with a directions client.
#[pymodule]
fn polyroute_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(decode, m)?)?;
    m.add_function(wrap_pyfunction!(encode, m)?)?;
    m.add_class::<DirectionsClient>()?;
    m.add_class::<Route>()?;
    m.add_class::<CacheStats>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("DEFAULT_PRECISION", polyroute_lib::polyline::DEFAULT_PRECISION)?;
    Ok(())
}
