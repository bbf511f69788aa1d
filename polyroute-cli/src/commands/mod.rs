use clap::ValueEnum;
use polyroute::Coordinate;

pub mod decode;
pub mod encode;
pub mod info;
pub mod route;

/// Output format for decoded routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `[[lon, lat], ...]`
    Json,
    /// LineString feature (FeatureCollection for several routes)
    Geojson,
    /// `route,index,lon,lat` rows
    Csv,
}

/// clap value parser for `LAT,LON` arguments.
pub fn parse_lat_lon(value: &str) -> Result<Coordinate, String> {
    polyroute::coord::parse_lat_lon(value).map_err(|e| e.to_string())
}
