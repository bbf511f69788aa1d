//! Basic example demonstrating polyroute library usage.
//!
//! Run with: cargo run --example basic -- '_p~iF~ps|U_ulLnnqC_mqNvxq`@'

use polyroute::{BoundingBox, PolylineError};
use std::env;

fn main() -> Result<(), PolylineError> {
    // Get encoded polyline from command line
    let encoded = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example basic -- <encoded-polyline>");
        std::process::exit(1);
    });

    let coords = match polyroute::decode(&encoded) {
        Ok(coords) => coords,
        Err(e) if e.is_malformed() => {
            eprintln!("Not a valid polyline: {}", e);
            std::process::exit(2);
        }
        Err(e) => return Err(e),
    };

    println!("Decoded {} points:", coords.len());
    println!("{:-<40}", "");

    for (i, c) in coords.iter().enumerate() {
        println!("{:>4}: lon={:.5} lat={:.5}", i, c.lon, c.lat);
    }

    if let Some(bbox) = BoundingBox::from_coordinates(&coords) {
        println!("\nBounding box:");
        println!("  South-west: {:.5}, {:.5}", bbox.min_lat, bbox.min_lon);
        println!("  North-east: {:.5}, {:.5}", bbox.max_lat, bbox.max_lon);
    }

    // Re-encoding gives the canonical form of the same route
    println!("\nRe-encoded: {}", polyroute::encode(&coords)?);

    Ok(())
}
