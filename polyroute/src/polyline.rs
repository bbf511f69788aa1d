//! Encoded Polyline Algorithm Format codec.
//!
//! This module decodes and encodes the compact ASCII route representation
//! returned by Google-compatible directions services
//! (`routes[0].overview_polyline.points`).
//!
//! # Format
//!
//! Each coordinate is stored as a latitude delta followed by a longitude delta
//! from the previous coordinate, scaled to integers by `10^precision`
//! (precision 5 for the Google format). Each delta is:
//!
//! 1. zig-zag mapped to an unsigned value (`(v << 1) ^ (v >> 63)`),
//! 2. split into 5-bit chunks, least significant first,
//! 3. emitted as one character per chunk: `chunk | 0x20` while more chunks
//!    follow, plus 63 to land in the printable range 63..=126.
//!
//! # Example
//!
//! ```
//! use polyroute::polyline::decode;
//!
//! let coords = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
//! assert_eq!(coords.len(), 3);
//! assert!((coords[0].lon - -120.2).abs() < 1e-9);
//! assert!((coords[0].lat - 38.5).abs() < 1e-9);
//! ```

use crate::coord::Coordinate;
use crate::error::{PolylineError, Result};

/// Precision of the Google encoded polyline format (5 decimal places).
pub const DEFAULT_PRECISION: u32 = 5;

/// Highest supported precision.
pub const MAX_PRECISION: u32 = 7;

/// Offset added to every 6-bit group to make it printable.
const CHAR_OFFSET: u8 = 63;

/// Highest character in the polyline alphabet (`'~'`).
const MAX_CHAR: u8 = 126;

/// Bit marking that more chunks follow for the current value.
const CONTINUATION_BIT: u64 = 0x20;

/// Payload bits carried by each character.
const CHUNK_MASK: u64 = 0x1f;

/// Longest value we accept: 7 chunks (35 bits) hold any delta at [`MAX_PRECISION`].
const MAX_CHUNKS_PER_VALUE: u32 = 7;

/// Streaming polyline decoder.
///
/// Yields one [`Coordinate`] per latitude/longitude pair. The first error ends
/// the iteration; no coordinate built from a partial pair is ever produced.
///
/// # Example
///
/// ```
/// use polyroute::polyline::Decoder;
///
/// let mut decoder = Decoder::new("CC");
/// let first = decoder.next().unwrap().unwrap();
/// assert!((first.lat - 0.00002).abs() < 1e-12);
/// assert!(decoder.next().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    encoded: &'a str,
    position: usize,
    lat: i64,
    lon: i64,
    scale: f64,
    failed: bool,
}

impl<'a> Decoder<'a> {
    /// Create a decoder for the Google format (precision 5).
    pub fn new(encoded: &'a str) -> Self {
        Self::with_scale(encoded, scale_for(DEFAULT_PRECISION))
    }

    /// Create a decoder for a custom precision.
    ///
    /// # Errors
    ///
    /// Returns [`PolylineError::InvalidPrecision`] if `precision` exceeds
    /// [`MAX_PRECISION`].
    pub fn with_precision(encoded: &'a str, precision: u32) -> Result<Self> {
        check_precision(precision)?;
        Ok(Self::with_scale(encoded, scale_for(precision)))
    }

    fn with_scale(encoded: &'a str, scale: f64) -> Self {
        Self {
            encoded,
            position: 0,
            lat: 0,
            lon: 0,
            scale,
            failed: false,
        }
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Decode one latitude/longitude pair starting at the cursor.
    fn next_pair(&mut self) -> Result<Coordinate> {
        let d_lat = self.next_value()?;

        if self.position >= self.encoded.len() {
            return Err(PolylineError::MissingLongitude {
                position: self.position,
            });
        }
        let d_lon = self.next_value()?;

        self.lat += d_lat;
        self.lon += d_lon;

        Ok(Coordinate::from_lon_lat(
            self.lon as f64 * self.scale,
            self.lat as f64 * self.scale,
        ))
    }

    /// Decode one zig-zag varint value starting at the cursor.
    fn next_value(&mut self) -> Result<i64> {
        let start = self.position;
        let mut result: u64 = 0;
        let mut shift: u32 = 0;

        loop {
            let byte = match self.encoded.as_bytes().get(self.position) {
                Some(&byte) => byte,
                None => return Err(PolylineError::TruncatedValue { position: start }),
            };

            if !(CHAR_OFFSET..=MAX_CHAR).contains(&byte) {
                // Every byte before the cursor is ASCII, so it sits on a char boundary
                let character = self.encoded[self.position..]
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(PolylineError::InvalidCharacter {
                    character,
                    position: self.position,
                });
            }
            if shift >= MAX_CHUNKS_PER_VALUE * 5 {
                return Err(PolylineError::ValueOverflow { position: start });
            }

            let b = u64::from(byte - CHAR_OFFSET);
            result |= (b & CHUNK_MASK) << shift;
            shift += 5;
            self.position += 1;

            if b & CONTINUATION_BIT == 0 {
                break;
            }
        }

        Ok(zigzag_decode(result))
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<Coordinate>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.encoded.len() {
            return None;
        }

        let pair = self.next_pair();
        if pair.is_err() {
            self.failed = true;
        }
        Some(pair)
    }
}

impl std::iter::FusedIterator for Decoder<'_> {}

/// Decode a Google encoded polyline (precision 5).
///
/// Returns coordinates in route order. An empty string decodes to an empty
/// vector.
///
/// # Errors
///
/// Returns a malformed-input error (see [`PolylineError::is_malformed`]) if
/// the string ends inside a value, ends after a latitude with no longitude,
/// contains a character outside ASCII 63..=126, or holds a value too long to
/// be a valid coordinate delta.
///
/// # Example
///
/// ```
/// use polyroute::polyline::decode;
///
/// assert!(decode("").unwrap().is_empty());
/// assert!(decode("_").unwrap_err().is_malformed());
/// ```
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>> {
    Decoder::new(encoded).collect()
}

/// Decode an encoded polyline with a custom precision.
///
/// Precision 6 is used by OSRM and Valhalla.
pub fn decode_with_precision(encoded: &str, precision: u32) -> Result<Vec<Coordinate>> {
    Decoder::with_precision(encoded, precision)?.collect()
}

/// Encode coordinates as a Google encoded polyline (precision 5).
///
/// # Errors
///
/// Returns [`PolylineError::InvalidCoordinate`] if a coordinate is not finite
/// or lies outside ±90° latitude / ±180° longitude.
///
/// # Example
///
/// ```
/// use polyroute::{polyline::encode, Coordinate};
///
/// let coords = [
///     Coordinate::new(38.5, -120.2),
///     Coordinate::new(40.7, -120.95),
///     Coordinate::new(43.252, -126.453),
/// ];
/// assert_eq!(encode(&coords).unwrap(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
/// ```
pub fn encode(coords: &[Coordinate]) -> Result<String> {
    encode_with_precision(coords, DEFAULT_PRECISION)
}

/// Encode coordinates with a custom precision.
pub fn encode_with_precision(coords: &[Coordinate], precision: u32) -> Result<String> {
    check_precision(precision)?;
    let factor = 10f64.powi(precision as i32);

    let mut out = String::with_capacity(coords.len() * 8);
    let (mut prev_lat, mut prev_lon) = (0i64, 0i64);

    for (i, coord) in coords.iter().enumerate() {
        if !coord.is_valid() {
            return Err(PolylineError::InvalidCoordinate {
                message: format!(
                    "coordinate {} out of range: lat={}, lon={}",
                    i, coord.lat, coord.lon
                ),
            });
        }

        let lat = (coord.lat * factor).round() as i64;
        let lon = (coord.lon * factor).round() as i64;

        push_value(&mut out, lat - prev_lat);
        push_value(&mut out, lon - prev_lon);

        prev_lat = lat;
        prev_lon = lon;
    }

    Ok(out)
}

/// Append one zig-zag varint value.
fn push_value(out: &mut String, value: i64) {
    let mut v = zigzag_encode(value);
    while v >= CONTINUATION_BIT {
        out.push(char::from((CONTINUATION_BIT | (v & CHUNK_MASK)) as u8 + CHAR_OFFSET));
        v >>= 5;
    }
    out.push(char::from(v as u8 + CHAR_OFFSET));
}

fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Odd values are negative: `!(v >> 1)` is `-(v >> 1) - 1`.
fn zigzag_decode(value: u64) -> i64 {
    if value & 1 == 1 {
        !((value >> 1) as i64)
    } else {
        (value >> 1) as i64
    }
}

fn check_precision(precision: u32) -> Result<()> {
    if precision > MAX_PRECISION {
        return Err(PolylineError::InvalidPrecision { precision });
    }
    Ok(())
}

/// `1 / 10^precision`; for precision 5 this is exactly the `1e-5` literal.
fn scale_for(precision: u32) -> f64 {
    1.0 / 10f64.powi(precision as i32)
}
