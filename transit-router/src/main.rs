use std::process::ExitCode;
use std::time::Instant;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use transit_router::domain::{Coordinates, InvalidCoordinates};
use transit_router::network::{NetworkConfig, NetworkError, TransitNetwork};
use transit_router::schedule::{Schedule, ScheduleError};

const USAGE: &str = "usage: transit-router <schedule.json> <orig_lat> <orig_lon> <dest_lat> <dest_lon> \
                     [<orig_lat> <orig_lon> <dest_lat> <dest_lon> ...]";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}", USAGE)]
    Usage,

    #[error("invalid number {0:?}")]
    Number(String),

    #[error(transparent)]
    Coordinates(#[from] InvalidCoordinates),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// One origin/destination pair from the command line.
struct Query {
    origin: Coordinates,
    destination: Coordinates,
}

fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn parse_queries(args: &[String]) -> Result<Vec<Query>, CliError> {
    if args.is_empty() || args.len() % 4 != 0 {
        return Err(CliError::Usage);
    }
    let numbers = args
        .iter()
        .map(|arg| arg.parse::<f64>().map_err(|_| CliError::Number(arg.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    numbers
        .chunks_exact(4)
        .map(|q| {
            Ok(Query {
                origin: Coordinates::new(q[0], q[1])?,
                destination: Coordinates::new(q[2], q[3])?,
            })
        })
        .collect()
}

fn millis(since: Instant) -> u128 {
    since.elapsed().as_millis()
}

fn run(args: &[String]) -> Result<(), CliError> {
    let (path, rest) = args.split_first().ok_or(CliError::Usage)?;
    let queries = parse_queries(rest)?;

    println!("Loading schedule from {path}...");
    let started = Instant::now();
    let schedule = Schedule::from_json_file(path)?;
    println!("Schedule loaded in {} ms", millis(started));
    println!("Service date: {}", schedule.date());
    println!("Time window: {} to {}", schedule.start(), schedule.end());
    println!("Stations with at least one stop: {}", schedule.num_stations());
    println!("Lines: {}", schedule.num_lines());
    println!("Trips: {}", schedule.num_trips());
    println!("Stop events: {}", schedule.stop_event_count());
    println!("Transfers: {}", schedule.transfers().len());

    let started = Instant::now();
    let mut network = TransitNetwork::build(&schedule, NetworkConfig::default())?;
    println!("Network built in {} ms", millis(started));
    println!("Vertices: {}", network.num_vertices());
    println!("Arcs: {}", network.num_arcs());

    for query in &queries {
        println!();
        println!("From {} to {}", query.origin, query.destination);

        let started = Instant::now();
        network.attach(&schedule, query.origin, query.destination)?;
        println!(
            "Access arcs attached in {} ms (within {} km at {} km/h)",
            millis(started),
            network.max_walk_km(),
            network.config().walking_speed_kmh()
        );
        println!("Arcs from the origin to a station: {}", network.origin_arc_count());
        println!(
            "Arcs from a station to the destination: {}",
            network.destination_arc_count()
        );

        let report = network.route(&schedule, true);
        network.detach()?;
        let report = report?;

        if let Some(narration) = &report.narration {
            println!();
            println!("{narration}");
        }
        println!(
            "Shortest path computed in {} microseconds",
            report.query_duration_micros
        );
    }

    Ok(())
}

fn main() -> ExitCode {
    init_logger();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
