//! GeoJSON conversion for decoded routes.
//!
//! This module turns coordinate sequences into the `LineString` feature map
//! renderers consume, and reads coordinates back out of GeoJSON geometries so
//! they can be encoded. Enable the `geojson` feature to use this module.
//!
//! # Example
//!
//! ```ignore
//! use polyroute::geojson::decode_to_feature;
//!
//! let feature = decode_to_feature("_p~iF~ps|U_ulLnnqC_mqNvxq`@")?;
//! // {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[-120.2, 38.5], ...]}}
//! println!("{}", feature);
//! ```

use geojson::{Feature, Geometry, Value as GeoJsonValue};

use crate::coord::Coordinate;
use crate::error::{PolylineError, Result};
use crate::polyline::decode;

/// Build a `LineString` geometry from coordinates.
///
/// Positions are written in GeoJSON order `[longitude, latitude]`.
pub fn to_line_string(coords: &[Coordinate]) -> Geometry {
    let positions = coords.iter().map(|c| c.to_position()).collect();
    Geometry::new(GeoJsonValue::LineString(positions))
}

/// Wrap coordinates in a `Feature` with a `LineString` geometry and no
/// properties.
pub fn to_feature(coords: &[Coordinate]) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(to_line_string(coords)),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

/// Decode an encoded polyline straight into a `LineString` feature.
///
/// # Errors
///
/// Returns a malformed-input error if the polyline cannot be decoded.
pub fn decode_to_feature(encoded: &str) -> Result<Feature> {
    let coords = decode(encoded)?;
    Ok(to_feature(&coords))
}

/// Read a single GeoJSON position `[lon, lat, ...]`.
///
/// # Errors
///
/// Returns [`PolylineError::InvalidCoordinate`] if the position has fewer
/// than 2 elements.
pub fn coordinate_from_position(position: &[f64]) -> Result<Coordinate> {
    match position {
        [lon, lat, ..] => Ok(Coordinate::from_lon_lat(*lon, *lat)),
        _ => Err(PolylineError::InvalidCoordinate {
            message: "Position must have at least 2 elements (lon, lat)".to_string(),
        }),
    }
}

/// Extract the coordinates of a `LineString` or `MultiPoint` geometry.
///
/// Any altitude component is dropped.
///
/// # Errors
///
/// Returns an error if:
/// - The geometry is neither `LineString` nor `MultiPoint`
/// - A position has fewer than 2 elements
pub fn coordinates_from_geometry(geometry: &Geometry) -> Result<Vec<Coordinate>> {
    match &geometry.value {
        GeoJsonValue::LineString(positions) | GeoJsonValue::MultiPoint(positions) => positions
            .iter()
            .map(|p| coordinate_from_position(p))
            .collect(),
        other => Err(PolylineError::UnsupportedGeometry {
            kind: geometry_kind(other).to_string(),
        }),
    }
}

fn geometry_kind(value: &GeoJsonValue) -> &'static str {
    match value {
        GeoJsonValue::Point(_) => "Point",
        GeoJsonValue::MultiPoint(_) => "MultiPoint",
        GeoJsonValue::LineString(_) => "LineString",
        GeoJsonValue::MultiLineString(_) => "MultiLineString",
        GeoJsonValue::Polygon(_) => "Polygon",
        GeoJsonValue::MultiPolygon(_) => "MultiPolygon",
        GeoJsonValue::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_line_string() {
        let coords = vec![Coordinate::new(38.5, -120.2), Coordinate::new(40.7, -120.95)];
        let geometry = to_line_string(&coords);

        if let GeoJsonValue::LineString(positions) = geometry.value {
            assert_eq!(positions, vec![vec![-120.2, 38.5], vec![-120.95, 40.7]]);
        } else {
            panic!("Expected LineString geometry");
        }
    }

    #[test]
    fn test_decode_to_feature() {
        let feature = decode_to_feature("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        let json = serde_json::to_value(&feature).unwrap();

        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "LineString");
        let coords = json["geometry"]["coordinates"].as_array().unwrap();
        assert_eq!(coords.len(), 3);
        assert!((coords[2][0].as_f64().unwrap() - -126.453).abs() < 1e-9);
        assert!((coords[2][1].as_f64().unwrap() - 43.252).abs() < 1e-9);
    }

    #[test]
    fn test_decode_to_feature_empty() {
        let feature = decode_to_feature("").unwrap();
        if let Some(Geometry {
            value: GeoJsonValue::LineString(positions),
            ..
        }) = feature.geometry
        {
            assert!(positions.is_empty());
        } else {
            panic!("Expected LineString geometry");
        }
    }

    #[test]
    fn test_decode_to_feature_malformed() {
        assert!(decode_to_feature("_").unwrap_err().is_malformed());
    }

    #[test]
    fn test_coordinates_from_line_string() {
        let geometry = Geometry::new(GeoJsonValue::LineString(vec![
            vec![-120.2, 38.5, 12.0],
            vec![-120.95, 40.7],
        ]));
        let coords = coordinates_from_geometry(&geometry).unwrap();
        assert_eq!(
            coords,
            vec![Coordinate::new(38.5, -120.2), Coordinate::new(40.7, -120.95)]
        );
    }

    #[test]
    fn test_coordinates_from_geometry_invalid_position() {
        let geometry = Geometry::new(GeoJsonValue::MultiPoint(vec![vec![-120.2]]));
        assert!(matches!(
            coordinates_from_geometry(&geometry),
            Err(PolylineError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_coordinates_from_geometry_unsupported() {
        let geometry = Geometry::new(GeoJsonValue::Point(vec![-120.2, 38.5]));
        let err = coordinates_from_geometry(&geometry).unwrap_err();
        assert!(err.to_string().contains("Point"));
    }
}
