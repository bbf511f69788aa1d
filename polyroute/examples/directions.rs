//! Fetch a driving route and print it as GeoJSON.
//!
//! Run with:
//! POLYROUTE_DIRECTIONS_API_KEY=... cargo run --example directions --features directions,geojson -- 19.4326,-99.1332 19.4270,-99.1677

use polyroute::coord::parse_lat_lon;
use polyroute::directions::DirectionsClientBuilder;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (origin, destination) = match (
        args.first().and_then(|a| parse_lat_lon(a).ok()),
        args.get(1).and_then(|a| parse_lat_lon(a).ok()),
    ) {
        (Some(o), Some(d)) => (o, d),
        _ => {
            eprintln!("Usage: cargo run --example directions -- LAT,LON LAT,LON");
            std::process::exit(1);
        }
    };

    let client = DirectionsClientBuilder::from_env()?.build()?;
    let route = client.route(origin, destination)?;

    eprintln!(
        "{}: {} points, {:.1} km, {:.0} min",
        route.summary,
        route.coordinates.len(),
        route.distance_meters / 1000.0,
        route.duration_seconds / 60.0
    );

    let feature = polyroute::geojson::to_feature(&route.coordinates);
    println!("{}", serde_json::to_string_pretty(&feature)?);

    Ok(())
}
