//! bengaluru — route across east Bengaluru at the current (or given) hour.
//!
//! ```text
//! cargo run -p bengaluru -- [HOUR] [--config engine.json]
//! ```
//!
//! Prints a GeoJSON `FeatureCollection` (route plus start/end markers) on
//! stdout and a short summary on stderr.  With `data_dir` set in the config,
//! graphs are read from `<data_dir>/bengaluru-india/{nodes,edges}.csv`;
//! otherwise a small synthetic network is used.  `RUST_LOG=debug` shows
//! cache, weighting and search detail.

mod network;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};

use rr_core::Hour;
use rr_engine::{
    CsvGraphProvider, EngineConfig, GraphProvider, ProviderError, RoutingEngine, StaticGeocoder,
};
use rr_graph::RoadGraph;

use network::{build_network, PLACES};

// ── Constants ─────────────────────────────────────────────────────────────────

const CITY:            &str = "Bengaluru, India";
const FROM:            &str = "Indiranagar";
const TO:              &str = "Koramangala";
const IST_OFFSET_SECS: i32  = 5 * 3600 + 30 * 60;

// ── Arguments ─────────────────────────────────────────────────────────────────

struct Args {
    hour:   Option<Hour>,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args { hour: None, config: None };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => {
                let path = it.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            other => {
                let h: u8 = other.parse().with_context(|| format!("bad hour {other:?}"))?;
                args.hour = Some(Hour::new(h)?);
            }
        }
    }
    Ok(args)
}

// ── Graph source ──────────────────────────────────────────────────────────────

fn synthetic(place: &str) -> Result<RoadGraph, ProviderError> {
    if place != CITY {
        return Err(ProviderError::UnknownPlace(place.to_owned()));
    }
    build_network().map_err(|source| ProviderError::Load { place: place.to_owned(), source })
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig { utc_offset_secs: IST_OFFSET_SECS, ..EngineConfig::default() },
    };
    let geocoder: StaticGeocoder = PLACES.into_iter().collect();

    match config.data_dir.clone() {
        Some(dir) => {
            log::info!("reading graphs from {}", dir.display());
            run(config, CsvGraphProvider::new(dir), geocoder, args.hour)
        }
        None => run(config, synthetic, geocoder, args.hour),
    }
}

fn run<P: GraphProvider>(
    config:   EngineConfig,
    provider: P,
    geocoder: StaticGeocoder,
    hour:     Option<Hour>,
) -> Result<()> {
    let engine = RoutingEngine::new(config, provider, geocoder)?;

    let t0 = Instant::now();
    let plan = match engine.route_places(CITY, FROM, TO, hour) {
        Ok(plan) => plan,
        Err(e) if e.is_no_path() => bail!("no valid route from {FROM} to {TO}"),
        Err(e) => return Err(e.into()),
    };
    let elapsed = t0.elapsed();

    let rush = engine.config().profile.is_rush_hour(plan.hour);
    eprintln!("=== {FROM} → {TO} ({CITY}) ===");
    eprintln!("  hour       : {} ({})", plan.hour, if rush { "rush hour" } else { "off-peak" });
    eprintln!("  nodes      : {}", plan.route.nodes.len());
    eprintln!("  cost       : {:.0}", plan.route.total_cost);
    eprintln!("  length     : {:.2} km", plan.polyline.length_m() / 1_000.0);
    eprintln!("  points     : {}", plan.polyline.len());
    eprintln!("  elapsed    : {elapsed:.2?}");

    println!("{}", serde_json::to_string_pretty(&plan.to_geojson())?);
    Ok(())
}
