use anyhow::{Context, Result};
use geojson::{Feature, JsonObject};
use polyroute::directions::{DirectionsClientBuilder, Route};
use polyroute::Coordinate;

pub fn run(
    origin: Coordinate,
    destination: Coordinate,
    api_key: String,
    base_url: Option<String>,
    raw: bool,
) -> Result<()> {
    // Single request, nothing to cache
    let mut builder = DirectionsClientBuilder::new(api_key).cache_size(1);
    if let Some(url) = base_url {
        builder = builder.base_url(url);
    }
    let client = builder
        .build()
        .context("Failed to create directions client")?;

    let route = client
        .route(origin, destination)
        .context("Failed to fetch route")?;

    if raw {
        println!("{}", route.encoded);
    } else {
        println!("{}", serde_json::to_string_pretty(&route_feature(&route))?);
    }

    Ok(())
}

/// LineString feature carrying the route summary as properties.
fn route_feature(route: &Route) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("summary".to_string(), route.summary.clone().into());
    properties.insert("distance_meters".to_string(), route.distance_meters.into());
    properties.insert(
        "duration_seconds".to_string(),
        route.duration_seconds.into(),
    );
    properties.insert("polyline".to_string(), route.encoded.clone().into());

    Feature {
        properties: Some(properties),
        ..polyroute::geojson::to_feature(&route.coordinates)
    }
}
