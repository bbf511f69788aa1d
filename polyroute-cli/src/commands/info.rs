use anyhow::{Context, Result};
use polyroute::{BoundingBox, Coordinate};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct PolylineInfo {
    points: usize,
    encoded_length: usize,
    precision: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bbox: Option<BoundingBox>,
}

/// Decode `polyline` and summarize it.
fn polyline_info(polyline: &str, precision: u32) -> Result<PolylineInfo> {
    let coords = polyroute::decode_with_precision(polyline, precision)
        .context("Failed to decode polyline")?;

    Ok(PolylineInfo {
        points: coords.len(),
        encoded_length: polyline.len(),
        precision,
        start: coords.first().copied(),
        end: coords.last().copied(),
        bbox: BoundingBox::from_coordinates(&coords),
    })
}

pub fn run(polyline: String, precision: u32, json: bool) -> Result<()> {
    let info = polyline_info(&polyline, precision)?;

    if json {
        println!("{}", serde_json::to_string(&info)?);
        return Ok(());
    }

    println!("Points: {}", info.points);
    println!(
        "Encoded length: {} chars ({:.1} per point)",
        info.encoded_length,
        if info.points > 0 {
            info.encoded_length as f64 / info.points as f64
        } else {
            0.0
        }
    );
    println!("Precision: {} decimal places", info.precision);

    if let (Some(start), Some(end)) = (info.start, info.end) {
        println!();
        println!("Start: {:.5}, {:.5}", start.lat, start.lon);
        println!("End: {:.5}, {:.5}", end.lat, end.lon);
    }

    if let Some(bbox) = info.bbox {
        let center = bbox.center();
        println!(
            "Bounds: {:.5},{:.5} to {:.5},{:.5}",
            bbox.min_lat, bbox.min_lon, bbox.max_lat, bbox.max_lon
        );
        println!("Center: {:.5}, {:.5}", center.lat, center.lon);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polyline_info_reference() {
        let info = polyline_info("_p~iF~ps|U_ulLnnqC_mqNvxq`@", 5).unwrap();

        assert_eq!(info.points, 3);
        assert_eq!(info.encoded_length, 27);
        assert_eq!(info.precision, 5);

        let start = info.start.unwrap();
        assert!((start.lat - 38.5).abs() < 1e-9);
        assert!((start.lon - -120.2).abs() < 1e-9);

        let bbox = info.bbox.unwrap();
        assert!((bbox.max_lat - 43.252).abs() < 1e-9);
        assert!((bbox.min_lon - -126.453).abs() < 1e-9);
    }

    #[test]
    fn test_polyline_info_empty() {
        let info = polyline_info("", 5).unwrap();
        assert_eq!(info.points, 0);
        assert!(info.start.is_none());
        assert!(info.bbox.is_none());

        // Optional fields are left out of the JSON output
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["points"], 0);
        assert!(json.get("bbox").is_none());
    }

    #[test]
    fn test_polyline_info_malformed() {
        let err = polyline_info("_p~iF", 5).unwrap_err();
        assert!(err.to_string().contains("Failed to decode"));
    }
}
