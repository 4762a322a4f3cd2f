use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::error;
use tracing_subscriber::EnvFilter;

use stop_sequencer::model::{Coordinate, RouteFlags, StartingPoint, Stop, StopId};
use stop_sequencer::navigation::{NavigationConfig, batch, navigation_points};
use stop_sequencer::optimizer::{OptimizeOptions, Optimization, optimize};
use stop_sequencer::osrm::{OsrmClient, OsrmConfig};

/// Orders delivery stops and prints the route with navigation links.
#[derive(Parser, Debug)]
#[command(name = "stop-sequencer", version)]
struct Args {
    /// JSON array of stops: {"address", "lat", "lng", "priority"?}
    stops: PathBuf,

    /// Starting point as "lat,lng"
    #[arg(long, value_parser = parse_coordinate)]
    start: Option<Coordinate>,

    /// Label for the starting point
    #[arg(long, default_value = "Start")]
    start_address: String,

    /// Return to the starting point at the end
    #[arg(long)]
    round_trip: bool,

    /// Skip the remote optimizer
    #[arg(long)]
    local_only: bool,

    /// OSRM base URL (defaults to OSRM_BASE_URL or the public demo server)
    #[arg(long)]
    osrm_url: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Deserialize)]
struct StopInput {
    address: String,
    lat: f64,
    lng: f64,
    #[serde(default)]
    priority: bool,
}

#[derive(Debug, Serialize)]
struct Output<'a> {
    source: String,
    fallback: Option<String>,
    distance_km: f64,
    road_distance_m: Option<f64>,
    road_duration_s: Option<f64>,
    stops: Vec<&'a Stop>,
    navigation: Vec<String>,
}

fn parse_coordinate(value: &str) -> Result<Coordinate, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| "expected \"lat,lng\"".to_string())?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("bad latitude: {}", lat))?;
    let lng: f64 = lng.trim().parse().map_err(|_| format!("bad longitude: {}", lng))?;
    Coordinate::new(lat, lng).map_err(|err| err.to_string())
}

fn load_stops(path: &PathBuf) -> Result<Vec<Stop>, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)?;
    let inputs: Vec<StopInput> = serde_json::from_str(&raw)?;
    inputs
        .into_iter()
        .enumerate()
        .map(|(idx, input)| -> Result<Stop, Box<dyn std::error::Error>> {
            let coordinate = Coordinate::new(input.lat, input.lng)?;
            let stop = Stop::new(StopId::new((idx + 1).to_string()), input.address, coordinate)
                .with_priority(input.priority);
            Ok(stop)
        })
        .collect()
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let stops = load_stops(&args.stops)?;
    let start = args
        .start
        .map(|coordinate| StartingPoint::new(args.start_address.clone(), coordinate));
    let flags = RouteFlags {
        round_trip: args.round_trip,
    };

    let client = if args.local_only {
        None
    } else {
        let mut config = OsrmConfig::from_env();
        if let Some(url) = args.osrm_url.clone() {
            config.base_url = url;
        }
        Some(OsrmClient::new(config)?)
    };

    let result = optimize(client.as_ref(), &stops, start.as_ref(), flags, &OptimizeOptions::default())?;
    let ordered: Vec<Stop> = result.tour.stops().iter().map(|stop| (*stop).clone()).collect();

    let nav_config = NavigationConfig::default();
    let points = navigation_points(&ordered, start.as_ref(), flags.round_trip, &nav_config);
    let links: Vec<String> = batch(&points, flags.round_trip, &nav_config)
        .iter()
        .map(|batch| batch.directions_url())
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output(&result, links))?);
    } else {
        print_text(&result, &links);
    }
    Ok(())
}

fn output<'a>(result: &Optimization<'a>, navigation: Vec<String>) -> Output<'a> {
    Output {
        source: format!("{:?}", result.source).to_lowercase(),
        fallback: result.fallback.as_ref().map(|reason| reason.to_string()),
        distance_km: result.distance_km,
        road_distance_m: result.road.as_ref().and_then(|road| road.distance_m),
        road_duration_s: result.road.as_ref().and_then(|road| road.duration_s),
        stops: result.tour.stops().to_vec(),
        navigation,
    }
}

fn print_text(result: &Optimization<'_>, links: &[String]) {
    println!("source: {:?}", result.source);
    if let Some(reason) = &result.fallback {
        println!("fallback: {}", reason);
    }
    println!("straight-line distance: {:.1} km", result.distance_km);
    for (position, stop) in result.tour.stops().iter().enumerate() {
        let marker = if stop.priority { " [priority]" } else { "" };
        println!("{:>3}. {}{}", position + 1, stop.address(), marker);
    }
    for (index, link) in links.iter().enumerate() {
        println!("navigation part {}: {}", index + 1, link);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "stop-sequencer failed");
            ExitCode::FAILURE
        }
    }
}
