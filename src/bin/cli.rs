//! commutematch CLI - Overlap analysis for commuting route pairs
//!
//! Usage:
//!   commutematch-cli compare <a.gpx> <b.gpx> [--mode <mode>] [--output <csv>]
//!   commutematch-cli batch <pairs.csv> [--mode <mode>] [--output <csv>]
//!
//! `compare` loads two GPX tracks and reports their overlap. `batch` reads
//! a CSV of origin/destination coordinate pairs, synthesizes great-circle
//! routes for each pair and writes one overlap row per pair. Both commands
//! accept the same approximation options.

use clap::{Parser, Subcommand};
use commutematch::{
    batch::RoutePair,
    compute_overlap, geo_utils,
    process_route_pairs,
    ApproximationMode, CachedFetcher, Coordinate, FetchError, OverlapConfig, OverlapError,
    OverlapResult, Route, RouteFetcher,
};
use gpx::{read, Gpx};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "commutematch-cli")]
#[command(about = "Overlap analysis for commuting route pairs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Boundary approximation mode (none, rectangle, bufferRatio, bufferExact)
    #[arg(short, long, global = true, default_value = "none")]
    mode: String,

    /// Rectangle intersection threshold in percent
    #[arg(short, long, global = true, default_value = "50")]
    threshold: f64,

    /// Rectangle width in meters
    #[arg(short, long, global = true, default_value = "100")]
    width: f64,

    /// Corridor buffer radius in meters
    #[arg(short, long, global = true, default_value = "100")]
    buffer_distance: f64,

    /// Skip the before/after splits (overlap only)
    #[arg(long, global = true)]
    overlap_only: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two GPX tracks
    Compare {
        /// GPX file with route A
        route_a: PathBuf,

        /// GPX file with route B
        route_b: PathBuf,

        /// Assumed travel speed in km/h for time estimates
        #[arg(long, default_value = "15")]
        speed_kmh: f64,

        /// Write the result as a single CSV row
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Process a CSV of origin/destination pairs with synthetic routes
    Batch {
        /// CSV with columns originA, destinationA, originB, destinationB
        /// (each a "lat,lon" string)
        pairs: PathBuf,

        /// Assumed travel speed in km/h for time estimates
        #[arg(long, default_value = "15")]
        speed_kmh: f64,

        /// Intermediate points per synthetic route
        #[arg(long, default_value = "50")]
        route_points: usize,

        /// Output CSV path
        #[arg(short, long, default_value = "overlap_results.csv")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    let mode = match ApproximationMode::from_str(&cli.mode) {
        Ok(mode) => mode,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(2);
        }
    };
    let config = OverlapConfig {
        mode,
        threshold: cli.threshold,
        width: cli.width,
        buffer_distance: cli.buffer_distance,
        compute_before_after: !cli.overlap_only,
    };
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    match cli.command {
        Commands::Compare {
            route_a,
            route_b,
            speed_kmh,
            output,
        } => run_compare(&route_a, &route_b, speed_kmh, output.as_ref(), &config),
        Commands::Batch {
            pairs,
            speed_kmh,
            route_points,
            output,
        } => run_batch(&pairs, speed_kmh, route_points, &output, &config),
    }
}

/// Load a GPX file as a route, estimating time from the assumed speed.
fn load_gpx_route(path: &PathBuf, speed_kmh: f64) -> commutematch::Result<Route> {
    let invalid = |reason: String| OverlapError::InvalidInput {
        path: path.display().to_string(),
        reason,
    };
    let file = File::open(path).map_err(|e| invalid(e.to_string()))?;
    let gpx: Gpx = read(BufReader::new(file)).map_err(|e| invalid(e.to_string()))?;

    let mut points = Vec::new();
    for track in &gpx.tracks {
        for segment in &track.segments {
            for pt in &segment.points {
                points.push(Coordinate::new(pt.point().y(), pt.point().x()));
            }
        }
    }
    if points.len() < 2 {
        return Err(invalid("fewer than 2 track points found".to_string()));
    }

    let distance_km = geo_utils::polyline_length_km(&points);
    let time_min = if speed_kmh > 0.0 {
        distance_km / speed_kmh * 60.0
    } else {
        0.0
    };
    Ok(Route::new(points, distance_km, time_min))
}

fn run_compare(
    path_a: &PathBuf,
    path_b: &PathBuf,
    speed_kmh: f64,
    output: Option<&PathBuf>,
    config: &OverlapConfig,
) {
    let route_a = match load_gpx_route(path_a, speed_kmh) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let route_b = match load_gpx_route(path_b, speed_kmh) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Route A: {} points, {:.2} km",
        route_a.points.len(),
        route_a.total_distance_km
    );
    println!(
        "Route B: {} points, {:.2} km",
        route_b.points.len(),
        route_b.total_distance_km
    );
    println!("Mode: {}", config.mode);

    let result = match compute_overlap(&route_a, &route_b, config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    print_result(&result, config);

    if let Some(path) = output {
        let pair = RoutePair {
            origin_a: route_a.points[0],
            destination_a: route_a.points[route_a.points.len() - 1],
            origin_b: route_b.points[0],
            destination_b: route_b.points[route_b.points.len() - 1],
        };
        write_results_csv(path, &[(pair, result)]);
        println!("\nWritten: {}", path.display());
    }
}

fn print_result(result: &OverlapResult, config: &OverlapConfig) {
    println!("\n{}", "-".repeat(60));
    match (result.first_common_index_a, result.last_common_index_a) {
        (Some(first), Some(last)) => {
            println!("Overlap found: nodes {}..={} on route A", first, last);
            println!(
                "  A: before {:.2} km / overlap {:.2} km / after {:.2} km",
                result.a_before_dist, result.a_overlap_dist, result.a_after_dist
            );
            println!(
                "  B: before {:.2} km / overlap {:.2} km / after {:.2} km",
                result.b_before_dist, result.b_overlap_dist, result.b_after_dist
            );
            println!(
                "  A time: {:.1} min overlapped of {:.1} min total",
                result.a_overlap_time, result.a_time
            );
            println!(
                "  B time: {:.1} min overlapped of {:.1} min total",
                result.b_overlap_time, result.b_time
            );
        }
        _ => println!("No node-level overlap found"),
    }

    if matches!(
        config.mode,
        ApproximationMode::BufferRatio | ApproximationMode::BufferExact
    ) {
        println!(
            "  Buffers: A {:.0} m2, B {:.0} m2, intersection {:.0} m2",
            result.a_area, result.b_area, result.intersection_area
        );
        println!(
            "  Intersection ratios: A {:.1}%, B {:.1}%",
            result.a_intersec_ratio * 100.0,
            result.b_intersec_ratio * 100.0
        );
    }
}

/// Raw CSV row of the batch input file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPair {
    origin_a: String,
    destination_a: String,
    origin_b: String,
    destination_b: String,
}

fn run_batch(
    pairs_path: &PathBuf,
    speed_kmh: f64,
    route_points: usize,
    output: &PathBuf,
    config: &OverlapConfig,
) {
    let invalid = |reason: String| OverlapError::InvalidInput {
        path: pairs_path.display().to_string(),
        reason,
    };
    let mut reader = match csv::Reader::from_path(pairs_path) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("Error: {}", invalid(e.to_string()));
            std::process::exit(1);
        }
    };

    let mut pairs = Vec::new();
    for (line, record) in reader.deserialize::<RawPair>().enumerate() {
        let raw = match record {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("Error: {}", invalid(format!("row {}: {}", line + 1, e)));
                std::process::exit(1);
            }
        };
        match parse_pair(&raw) {
            Ok(pair) => pairs.push(pair),
            Err(e) => {
                eprintln!("Error: {}", invalid(format!("row {}: {}", line + 1, e)));
                std::process::exit(1);
            }
        }
    }
    println!("Loaded {} pair(s) from {}", pairs.len(), pairs_path.display());

    let fetcher = CachedFetcher::new(GreatCircleFetcher {
        speed_kmh,
        points: route_points.max(2),
    });
    let records = match process_route_pairs(&fetcher, &pairs, config) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    println!(
        "Processed {} pair(s) ({} distinct routes fetched)",
        records.len(),
        fetcher.cached_responses()
    );

    let rows: Vec<(RoutePair, OverlapResult)> =
        records.into_iter().map(|r| (r.pair, r.result)).collect();
    write_results_csv(output, &rows);
    println!("Written: {}", output.display());
}

fn parse_pair(raw: &RawPair) -> Result<RoutePair, String> {
    Ok(RoutePair {
        origin_a: Coordinate::from_str(&raw.origin_a).map_err(|e| e.to_string())?,
        destination_a: Coordinate::from_str(&raw.destination_a).map_err(|e| e.to_string())?,
        origin_b: Coordinate::from_str(&raw.origin_b).map_err(|e| e.to_string())?,
        destination_b: Coordinate::from_str(&raw.destination_b).map_err(|e| e.to_string())?,
    })
}

/// Offline route source: interpolates a great-circle-ish straight line
/// between origin and destination. Good enough for dry runs and demos
/// without a routing provider.
struct GreatCircleFetcher {
    speed_kmh: f64,
    points: usize,
}

impl RouteFetcher for GreatCircleFetcher {
    fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Route, FetchError> {
        let steps = self.points - 1;
        let points: Vec<Coordinate> = (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                Coordinate::new(
                    origin.latitude + (destination.latitude - origin.latitude) * t,
                    origin.longitude + (destination.longitude - origin.longitude) * t,
                )
            })
            .collect();
        let distance_km = geo_utils::polyline_length_km(&points);
        let time_min = if self.speed_kmh > 0.0 {
            distance_km / self.speed_kmh * 60.0
        } else {
            0.0
        };
        Ok(Route::new(points, distance_km, time_min))
    }
}

/// Write result rows in the batch output schema.
fn write_results_csv(path: &PathBuf, rows: &[(RoutePair, OverlapResult)]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create output CSV");

    writer
        .write_record([
            "originA",
            "destinationA",
            "originB",
            "destinationB",
            "aDist",
            "aTime",
            "bDist",
            "bTime",
            "aOverlapDist",
            "aOverlapTime",
            "bOverlapDist",
            "bOverlapTime",
            "aBeforeDist",
            "aBeforeTime",
            "bBeforeDist",
            "bBeforeTime",
            "aAfterDist",
            "aAfterTime",
            "bAfterDist",
            "bAfterTime",
            "aIntersecRatio",
            "bIntersecRatio",
        ])
        .expect("Failed to write CSV header");

    let coord = |c: &Coordinate| format!("{},{}", c.latitude, c.longitude);
    for (pair, result) in rows {
        writer
            .write_record([
                coord(&pair.origin_a),
                coord(&pair.destination_a),
                coord(&pair.origin_b),
                coord(&pair.destination_b),
                format!("{:.4}", result.a_dist),
                format!("{:.2}", result.a_time),
                format!("{:.4}", result.b_dist),
                format!("{:.2}", result.b_time),
                format!("{:.4}", result.a_overlap_dist),
                format!("{:.2}", result.a_overlap_time),
                format!("{:.4}", result.b_overlap_dist),
                format!("{:.2}", result.b_overlap_time),
                format!("{:.4}", result.a_before_dist),
                format!("{:.2}", result.a_before_time),
                format!("{:.4}", result.b_before_dist),
                format!("{:.2}", result.b_before_time),
                format!("{:.4}", result.a_after_dist),
                format!("{:.2}", result.a_after_time),
                format!("{:.4}", result.b_after_dist),
                format!("{:.2}", result.b_after_time),
                format!("{:.4}", result.a_intersec_ratio),
                format!("{:.4}", result.b_intersec_ratio),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV");
}
