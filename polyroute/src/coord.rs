//! Geographic coordinates and bounding boxes.

use serde::{Deserialize, Serialize};

use crate::error::{PolylineError, Result};

/// A WGS84 position in decimal degrees.
///
/// Serialized longitude-first as `[lon, lat]`, matching GeoJSON position order
/// and the order in which decoded routes are handed to map renderers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Latitude in decimal degrees.
    pub lat: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude.
    ///
    /// Note the argument order: latitude first, as in `origin=LAT,LON` query
    /// strings. Use [`Coordinate::from_lon_lat`] for GeoJSON order.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lon, lat }
    }

    /// Create a coordinate from a GeoJSON-ordered pair.
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// The coordinate as a GeoJSON position `[lon, lat]`.
    pub fn to_position(self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }

    /// Whether both components are finite and within WGS84 range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

/// Parse a `LAT,LON` pair, as used in directions `origin`/`destination`
/// parameters.
///
/// # Errors
///
/// Returns [`PolylineError::InvalidCoordinate`] if the value is not two
/// comma-separated numbers or lies outside WGS84 range.
///
/// # Examples
///
/// ```
/// use polyroute::coord::parse_lat_lon;
///
/// let c = parse_lat_lon("19.4326,-99.1332").unwrap();
/// assert_eq!((c.lat, c.lon), (19.4326, -99.1332));
/// assert!(parse_lat_lon("19.4326").is_err());
/// ```
pub fn parse_lat_lon(value: &str) -> Result<Coordinate> {
    let invalid = |message: String| PolylineError::InvalidCoordinate { message };

    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| invalid(format!("expected LAT,LON, got '{}'", value)))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| invalid(format!("invalid latitude '{}'", lat.trim())))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| invalid(format!("invalid longitude '{}'", lon.trim())))?;

    let coord = Coordinate::new(lat, lon);
    if !coord.is_valid() {
        return Err(invalid(format!("out of range: {}", value)));
    }
    Ok(coord)
}

/// A geographic bounding box.
///
/// Coordinates are in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude (southern boundary).
    pub min_lat: f64,
    /// Minimum longitude (western boundary).
    pub min_lon: f64,
    /// Maximum latitude (northern boundary).
    pub max_lat: f64,
    /// Maximum longitude (eastern boundary).
    pub max_lon: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    ///
    /// # Arguments
    ///
    /// * `min_lat` - Southern boundary latitude
    /// * `min_lon` - Western boundary longitude
    /// * `max_lat` - Northern boundary latitude
    /// * `max_lon` - Eastern boundary longitude
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Smallest box containing every coordinate, or `None` for an empty slice.
    ///
    /// Routes crossing the antimeridian get a box spanning the whole
    /// longitude range between their extremes.
    pub fn from_coordinates(coords: &[Coordinate]) -> Option<Self> {
        let first = coords.first()?;
        let init = Self::new(first.lat, first.lon, first.lat, first.lon);

        Some(coords.iter().skip(1).fold(init, |b, c| {
            Self::new(
                b.min_lat.min(c.lat),
                b.min_lon.min(c.lon),
                b.max_lat.max(c.lat),
                b.max_lon.max(c.lon),
            )
        }))
    }

    /// Check whether a coordinate lies inside the box (edges inclusive).
    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coord.lat)
            && (self.min_lon..=self.max_lon).contains(&coord.lon)
    }

    /// Center of the box.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}
