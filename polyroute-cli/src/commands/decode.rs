use anyhow::{bail, Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use indicatif::{ProgressBar, ProgressStyle};
use polyroute::Coordinate;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use super::OutputFormat;

pub fn run(
    polyline: Option<String>,
    input: Option<PathBuf>,
    precision: u32,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let lines = match (polyline, input) {
        (Some(p), _) => vec![p],
        (None, Some(path)) => {
            let file = File::open(&path).context("Failed to open input file")?;
            read_lines(BufReader::new(file))?
        }
        (None, None) => read_lines(io::stdin().lock())?,
    };

    if lines.is_empty() {
        bail!("No polyline given");
    }

    let routes = decode_all(&lines, precision)?;

    let mut writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).context("Failed to create output file")?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match format {
        OutputFormat::Json => write_json(&mut writer, &routes)?,
        OutputFormat::Geojson => write_geojson(&mut writer, &routes)?,
        OutputFormat::Csv => write_csv(&mut writer, &routes)?,
    }
    writer.flush()?;

    if let Some(path) = output {
        eprintln!("Output written to: {}", path.display());
    }
    Ok(())
}

/// Non-empty, trimmed lines.
fn read_lines(reader: impl BufRead) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read input")?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    Ok(lines)
}

fn decode_all(lines: &[String], precision: u32) -> Result<Vec<Vec<Coordinate>>> {
    // Only show progress for batches
    let pb = if lines.len() > 1 {
        let pb = ProgressBar::new(lines.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )?
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut routes = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let coords = polyroute::decode_with_precision(line, precision)
            .with_context(|| format!("Failed to decode polyline on line {}", i + 1))?;
        routes.push(coords);
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(routes)
}

fn write_json(writer: &mut dyn Write, routes: &[Vec<Coordinate>]) -> Result<()> {
    if let [single] = routes {
        serde_json::to_writer(&mut *writer, single)?;
    } else {
        serde_json::to_writer(&mut *writer, routes)?;
    }
    writeln!(writer)?;
    Ok(())
}

fn write_geojson(writer: &mut dyn Write, routes: &[Vec<Coordinate>]) -> Result<()> {
    let geojson = if let [single] = routes {
        GeoJson::Feature(polyroute::geojson::to_feature(single))
    } else {
        let features = routes
            .iter()
            .enumerate()
            .map(|(i, coords)| {
                let mut properties = JsonObject::new();
                properties.insert("route".to_string(), i.into());
                Feature {
                    properties: Some(properties),
                    ..polyroute::geojson::to_feature(coords)
                }
            })
            .collect();
        GeoJson::FeatureCollection(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    };

    serde_json::to_writer_pretty(&mut *writer, &geojson)?;
    writeln!(writer)?;
    Ok(())
}

fn write_csv(writer: &mut dyn Write, routes: &[Vec<Coordinate>]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["route", "index", "lon", "lat"])?;

    for (route, coords) in routes.iter().enumerate() {
        for (index, c) in coords.iter().enumerate() {
            csv_writer.write_record([
                route.to_string(),
                index.to_string(),
                c.lon.to_string(),
                c.lat.to_string(),
            ])?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}
