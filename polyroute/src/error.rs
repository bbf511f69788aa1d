//! Error types for the polyroute library.

use thiserror::Error;

/// Errors that can occur when decoding, encoding or fetching routes.
#[derive(Error, Debug)]
pub enum PolylineError {
    /// The input ends inside a value (continuation bit set on the last character).
    #[error("Malformed polyline: value starting at byte {position} is truncated")]
    TruncatedValue { position: usize },

    /// The input ends after a latitude with no matching longitude.
    #[error("Malformed polyline: latitude ending at byte {position} has no longitude")]
    MissingLongitude { position: usize },

    /// A byte outside the polyline alphabet (ASCII 63..=126).
    #[error("Malformed polyline: invalid character {character:?} at byte {position}")]
    InvalidCharacter { character: char, position: usize },

    /// A single value spans more characters than any coordinate delta needs.
    #[error("Malformed polyline: value starting at byte {position} overflows")]
    ValueOverflow { position: usize },

    /// Precision outside the supported range.
    #[error("Invalid precision: {precision} (valid: 0..=7)")]
    InvalidPrecision { precision: u32 },

    /// A coordinate that cannot be encoded.
    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    /// A GeoJSON geometry type that has no polyline representation.
    #[error("Unsupported geometry type: {kind} (expected LineString or MultiPoint)")]
    UnsupportedGeometry { kind: String },

    /// HTTP error while talking to the directions service.
    #[cfg(feature = "directions")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The directions response body is not valid JSON for the expected shape.
    #[cfg(feature = "directions")]
    #[error("Failed to parse directions response: {0}")]
    Json(#[from] serde_json::Error),

    /// The directions service answered with a non-OK status.
    #[cfg(feature = "directions")]
    #[error("Directions request failed ({status}): {message}")]
    DirectionsFailed { status: String, message: String },

    /// The directions service returned no route.
    #[cfg(feature = "directions")]
    #[error("No route found between origin and destination")]
    NoRoute,

    /// No API key was configured for the directions service.
    #[cfg(feature = "directions")]
    #[error("Directions API key not set")]
    MissingApiKey,

    /// The HTTP client could not be created.
    #[cfg(feature = "directions")]
    #[error("Failed to create HTTP client: {reason}")]
    ClientBuild { reason: String },
}

impl PolylineError {
    /// Whether this error means the encoded input itself is malformed.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            PolylineError::TruncatedValue { .. }
                | PolylineError::MissingLongitude { .. }
                | PolylineError::InvalidCharacter { .. }
                | PolylineError::ValueOverflow { .. }
        )
    }
}

/// Result type alias using [`PolylineError`].
pub type Result<T> = std::result::Result<T, PolylineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PolylineError::TruncatedValue { position: 12 };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("truncated"));

        let err = PolylineError::InvalidCharacter {
            character: ' ',
            position: 3,
        };
        assert!(err.to_string().contains("' '"));

        let err = PolylineError::InvalidPrecision { precision: 42 };
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_is_malformed() {
        assert!(PolylineError::TruncatedValue { position: 0 }.is_malformed());
        assert!(PolylineError::MissingLongitude { position: 2 }.is_malformed());
        assert!(PolylineError::ValueOverflow { position: 0 }.is_malformed());
        assert!(!PolylineError::InvalidPrecision { precision: 11 }.is_malformed());
        assert!(!PolylineError::InvalidCoordinate {
            message: "NaN".to_string()
        }
        .is_malformed());
    }
}
