use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{parse_lat_lon, OutputFormat};
use polyroute::Coordinate;

/// Encoded polyline route CLI tool
#[derive(Parser)]
#[command(name = "polyroute")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Decimal places encoded in the polyline (5 for Google, 6 for OSRM/Valhalla)
    #[arg(
        short,
        long,
        env = "POLYROUTE_PRECISION",
        default_value = "5",
        global = true
    )]
    precision: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode encoded polylines into coordinates
    Decode {
        /// Encoded polyline (reads stdin if neither this nor --input is given)
        polyline: Option<String>,

        /// File with one encoded polyline per line
        #[arg(short, long, conflicts_with = "polyline")]
        input: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode coordinates from a file into polylines
    Encode {
        /// Input file (CSV or GeoJSON)
        input: PathBuf,

        /// Column name for latitude (CSV only)
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude (CSV only)
        #[arg(long, default_value = "lon")]
        lon_col: String,
    },

    /// Fetch a driving route from the directions service
    Route {
        /// Start point as LAT,LON
        #[arg(long, value_parser = parse_lat_lon, allow_hyphen_values = true)]
        origin: Coordinate,

        /// End point as LAT,LON
        #[arg(long, value_parser = parse_lat_lon, allow_hyphen_values = true)]
        destination: Coordinate,

        /// Directions API key
        #[arg(long, env = "POLYROUTE_DIRECTIONS_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Directions endpoint
        #[arg(long, env = "POLYROUTE_DIRECTIONS_URL")]
        base_url: Option<String>,

        /// Print the encoded polyline instead of GeoJSON
        #[arg(long)]
        raw: bool,
    },

    /// Display information about an encoded polyline
    Info {
        /// Encoded polyline
        polyline: String,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            polyline,
            input,
            format,
            output,
        } => commands::decode::run(polyline, input, cli.precision, format, output),
        Commands::Encode {
            input,
            lat_col,
            lon_col,
        } => commands::encode::run(input, cli.precision, lat_col, lon_col),
        Commands::Route {
            origin,
            destination,
            api_key,
            base_url,
            raw,
        } => commands::route::run(origin, destination, api_key, base_url, raw),
        Commands::Info { polyline, json } => commands::info::run(polyline, cli.precision, json),
    }
}
