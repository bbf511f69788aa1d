//! # polyroute - Encoded Polyline Library
//!
//! Fast, exact codec for the Encoded Polyline Algorithm Format used by
//! Google-compatible directions services, plus helpers to turn decoded routes
//! into GeoJSON and to fetch routes from a directions API.
//!
//! ## Features
//!
//! - **Exact**: Bit-for-bit compatible with the reference decoder
//! - **Strict**: Truncated or odd-length input is an error, never a partial coordinate
//! - **Streaming**: [`polyline::Decoder`] yields coordinates one pair at a time
//! - **Optional extras**: `geojson` (line features) and `directions` (HTTP client)
//!
//! ## Quick Start
//!
//! ```
//! use polyroute::polyline;
//!
//! let coords = polyline::decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
//! assert_eq!(coords.len(), 3);
//!
//! // Longitude first, like GeoJSON
//! let json = serde_json::to_string(&coords[0]).unwrap();
//! assert_eq!(json, "[-120.2,38.5]");
//! ```
//!
//! ## Polyline Format
//!
//! Each coordinate is a latitude delta then a longitude delta from the previous
//! point, scaled by 1e5, zig-zag encoded and packed 5 bits per printable
//! character (ASCII 63..=126), with `0x20` marking that more characters follow.
//!
//! Reference: <https://developers.google.com/maps/documentation/utilities/polylinealgorithm>

pub mod coord;
pub mod error;
pub mod polyline;

#[cfg(feature = "directions")]
pub mod directions;

#[cfg(feature = "geojson")]
pub mod geojson;

// Re-export main types at crate root for convenience
pub use coord::{BoundingBox, Coordinate};
pub use error::{PolylineError, Result};
pub use polyline::{decode, decode_with_precision, encode, encode_with_precision, Decoder};

#[cfg(feature = "directions")]
pub use directions::{CacheStats, DirectionsClient, DirectionsClientBuilder, Route};
