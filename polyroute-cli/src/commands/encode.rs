use anyhow::{bail, Context, Result};
use geojson::{GeoJson, Geometry};
use polyroute::Coordinate;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

pub fn run(input: PathBuf, precision: u32, lat_col: String, lon_col: String) -> Result<()> {
    // Detect file format
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let file = File::open(&input).context("Failed to open input file")?;
    let reader = BufReader::new(file);

    let routes = match extension.as_str() {
        "csv" => vec![read_csv(reader, &lat_col, &lon_col)?],
        "geojson" | "json" => read_geojson(reader)?,
        _ => bail!(
            "Unsupported file format: {}. Use .csv or .geojson",
            extension
        ),
    };

    if routes.is_empty() {
        bail!("No LineString or MultiPoint geometry in {}", input.display());
    }

    for (i, coords) in routes.iter().enumerate() {
        let encoded = polyroute::encode_with_precision(coords, precision)
            .with_context(|| format!("Failed to encode route {}", i))?;
        println!("{}", encoded);
    }

    Ok(())
}

/// Read every row of a CSV file as one route.
fn read_csv(reader: impl Read, lat_col: &str, lon_col: &str) -> Result<Vec<Coordinate>> {
    let mut reader = csv::Reader::from_reader(reader);

    // Find column indices
    let headers = reader.headers()?.clone();
    let lat_idx = headers
        .iter()
        .position(|h| h == lat_col)
        .with_context(|| format!("Column '{}' not found in CSV", lat_col))?;
    let lon_idx = headers
        .iter()
        .position(|h| h == lon_col)
        .with_context(|| format!("Column '{}' not found in CSV", lon_col))?;

    let mut coords = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let lat: f64 = record
            .get(lat_idx)
            .context("Missing latitude")?
            .trim()
            .parse()
            .with_context(|| format!("Invalid latitude on row {}", row + 1))?;
        let lon: f64 = record
            .get(lon_idx)
            .context("Missing longitude")?
            .trim()
            .parse()
            .with_context(|| format!("Invalid longitude on row {}", row + 1))?;

        coords.push(Coordinate::new(lat, lon));
    }

    Ok(coords)
}

/// Collect one route per LineString / MultiPoint geometry.
fn read_geojson(reader: impl Read) -> Result<Vec<Vec<Coordinate>>> {
    let geojson: GeoJson = serde_json::from_reader(reader).context("Failed to parse GeoJSON")?;

    let geometries: Vec<Geometry> = match geojson {
        GeoJson::Geometry(geometry) => vec![geometry],
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .collect(),
    };

    geometries
        .iter()
        .map(|geometry| {
            polyroute::geojson::coordinates_from_geometry(geometry)
                .context("Failed to read coordinates from geometry")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv() {
        let data = "name,lat,lon\na,38.5,-120.2\nb,40.7,-120.95\nc,43.252,-126.453\n";
        let coords = read_csv(data.as_bytes(), "lat", "lon").unwrap();

        assert_eq!(coords.len(), 3);
        assert_eq!(
            polyroute::encode(&coords).unwrap(),
            "_p~iF~ps|U_ulLnnqC_mqNvxq`@"
        );
    }

    #[test]
    fn test_read_csv_missing_column() {
        let data = "latitude,lon\n38.5,-120.2\n";
        let err = read_csv(data.as_bytes(), "lat", "lon").unwrap_err();
        assert!(err.to_string().contains("'lat'"));
    }

    #[test]
    fn test_read_geojson_feature_collection() {
        let data = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "LineString", "coordinates": [[-120.2, 38.5], [-120.95, 40.7]]}},
                {"type": "Feature", "properties": {}, "geometry": null},
                {"type": "Feature", "properties": {}, "geometry": {"type": "MultiPoint", "coordinates": [[0.00002, 0.00002]]}}
            ]
        }"#;
        let routes = read_geojson(data.as_bytes()).unwrap();

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].len(), 2);
        assert_eq!(polyroute::encode(&routes[1]).unwrap(), "CC");
    }

    #[test]
    fn test_read_geojson_rejects_polygon() {
        let data = r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}"#;
        assert!(read_geojson(data.as_bytes()).is_err());
    }
}
