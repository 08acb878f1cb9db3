//! Fence check tool.
//!
//! Loads locations and fence boundaries from a TOML config and classifies
//! GPS fixes against them, either one at a time or from a CSV track.

mod fixes;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use geo::Point;
use hashbrown::HashMap;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geofence::config::Config;
use geofence::fence::{self, Classification, FenceTracker, Transition};
use geofence::{GeofenceError, LocationRegistry};

use crate::fixes::{load_fixes, Fix};

#[derive(Parser, Debug)]
#[command(name = "fence-check")]
#[command(about = "Classify GPS fixes against polar geofences")]
struct Args {
    /// TOML file with locations and fence boundaries
    #[arg(short, long)]
    config: PathBuf,

    /// Location id for a single fix
    #[arg(short, long, requires_all = ["lon", "lat"])]
    location: Option<String>,

    /// Longitude of a single fix
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Latitude of a single fix
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// CSV file of fixes (location,lon,lat), optionally gzipped
    #[arg(long, conflicts_with = "location")]
    fixes: Option<PathBuf>,

    /// Print results as JSON lines
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Outcome for one fix
#[derive(Serialize, Debug)]
struct FixResult {
    location: String,
    lon: f64,
    lat: f64,
    near: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    classification: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    margin_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transition: Option<Transition>,
}

/// Summary line for a configured location
#[derive(Serialize, Debug)]
struct LocationSummary {
    id: String,
    label: String,
    lon: f64,
    lat: f64,
    fence_samples: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(args.verbose))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Geofence check v{}", geofence::VERSION);
    info!("Config: {}", args.config.display());

    let config = Config::load_from_file(&args.config)?;
    let registry = config.build_registry()?;

    if let Some(path) = &args.fixes {
        let fixes = load_fixes(path)?;
        run_track(&registry, &fixes, args.json)?;
    } else if let (Some(location), Some(lon), Some(lat)) = (&args.location, args.lon, args.lat) {
        let fix = Fix {
            location: location.clone(),
            lon,
            lat,
        };
        let result = check_fix(&registry, &fix, None)?;
        print_result(&result, args.json)?;
    } else {
        list_locations(&registry, args.json)?;
    }

    Ok(())
}

/// `--verbose` wins over `RUST_LOG`, which wins over the `info` default.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Classify a single fix, feeding the tracker when one is given.
fn check_fix(
    registry: &LocationRegistry,
    fix: &Fix,
    tracker: Option<&mut FenceTracker>,
) -> Result<FixResult> {
    let index = registry
        .lookup_location(&fix.location)
        .with_context(|| format!("Fix for unknown location '{}'", fix.location))?;
    let location = registry.location(index)?;
    let point = Point::new(fix.lon, fix.lat);

    let near = registry.is_near(index, point)?;

    let (classification, margin_m) = match registry.fence_for(index) {
        Ok(polar) => {
            let measurement = fence::measure(point, location, polar);
            let classification = fence::classify_margin(measurement.margin_m, location);
            (Some(classification), Some(measurement.margin_m))
        }
        Err(GeofenceError::NoFence(_)) => (None, None),
        Err(e) => return Err(e.into()),
    };

    let transition = match (tracker, classification) {
        (Some(tracker), Some(classification)) => tracker.update(classification),
        _ => None,
    };

    Ok(FixResult {
        location: fix.location.clone(),
        lon: fix.lon,
        lat: fix.lat,
        near,
        classification,
        margin_m,
        transition,
    })
}

/// Classify a track of fixes with one hysteresis tracker per location.
fn run_track(registry: &LocationRegistry, fixes: &[Fix], json: bool) -> Result<()> {
    let mut trackers: HashMap<String, FenceTracker> = HashMap::new();
    let mut transitions = 0usize;

    for fix in fixes {
        if registry.lookup_location(&fix.location).is_err() {
            warn!("Skipping fix for unknown location '{}'", fix.location);
            continue;
        }

        let tracker = trackers
            .entry(fix.location.clone())
            .or_insert_with(|| FenceTracker::new(fix.location.clone()));

        let result = check_fix(registry, fix, Some(tracker))?;
        if result
            .transition
            .map_or(false, |t| t.is_entry() || t.is_exit())
        {
            transitions += 1;
        }
        print_result(&result, json)?;
    }

    info!(
        "Processed {} fixes, {} state transitions",
        fixes.len(),
        transitions
    );
    Ok(())
}

fn print_result(result: &FixResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }

    let classification = result
        .classification
        .map(|c| c.to_string())
        .unwrap_or_else(|| "no fence".to_string());
    let margin = result
        .margin_m
        .map(|m| format!(" margin={:.1}m", m))
        .unwrap_or_default();
    let transition = result
        .transition
        .map(|t| format!(" [{:?} -> {:?}]", t.from, t.to))
        .unwrap_or_default();

    println!(
        "{} ({}, {}): {}{} near={}{}",
        result.location, result.lon, result.lat, classification, margin, result.near, transition
    );
    Ok(())
}

fn list_locations(registry: &LocationRegistry, json: bool) -> Result<()> {
    for (index, location) in registry.locations().iter().enumerate() {
        let summary = LocationSummary {
            id: location.id().to_string(),
            label: location.label().to_string(),
            lon: location.reference().lon,
            lat: location.reference().lat,
            fence_samples: registry.fence_for(index).ok().map(|f| f.len()),
        };

        if json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            println!(
                "{} \"{}\" at ({}, {}): {}",
                summary.id,
                summary.label,
                summary.lon,
                summary.lat,
                summary
                    .fence_samples
                    .map(|n| format!("{} fence samples", n))
                    .unwrap_or_else(|| "no fence".to_string())
            );
        }
    }
    Ok(())
}
