use clap::{App, Arg, ArgMatches};
use colored::*;
use elevsim::stats::{round_secs, SimulationReport};
use elevsim::{Building, SimConfig};
use std::fmt::Display;
use std::process;
use std::str::FromStr;
use tracing::Level;

#[tokio::main]
async fn main() {
    let matches = App::new("elevsim")
        .version("0.1.0")
        .author("Building Systems Simulation Team")
        .about("🛗 Elevator dispatch simulator")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("JSON configuration file")
                .takes_value(true),
        )
        .arg(number_arg::<u32>("floors", "Number of floors"))
        .arg(number_arg::<u32>("elevators", "Number of elevators"))
        .arg(number_arg::<u32>("people-per-minute", "Passengers created per minute"))
        .arg(number_arg::<u64>("duration-ms", "How long passengers are produced, in milliseconds"))
        .arg(number_arg::<u64>("seed", "Seed for passenger production"))
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["table", "json"])
                .default_value("table"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Log verbosity, repeat for more"),
        )
        .arg(
            Arg::with_name("print-config")
                .long("print-config")
                .help("Print the effective configuration as JSON and exit"),
        )
        .get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "❌".red(), e.bright_red());
            process::exit(2);
        }
    };

    if matches.is_present("print-config") {
        match serde_json::to_string_pretty(&config) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{} Failed to serialize configuration: {}", "❌".red(), e);
                process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = config.validate() {
        eprintln!("{} {}", "❌".red(), e.to_string().bright_red());
        process::exit(2);
    }

    let report = match Building::run(config.clone()).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} Simulation failed: {}", "❌".red(), e.to_string().bright_red());
            process::exit(1);
        }
    };

    match matches.value_of("format") {
        Some("json") => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{} Failed to serialize report: {}", "❌".red(), e);
                process::exit(1);
            }
        },
        _ => print_report(&config, &report),
    }
}

fn number_arg<'a, T>(name: &'a str, help: &'a str) -> Arg<'a, 'a>
where
    T: FromStr + 'static,
    T::Err: Display,
{
    Arg::with_name(name)
        .long(name)
        .value_name("N")
        .help(help)
        .takes_value(true)
        .validator(|v| v.parse::<T>().map(|_| ()).map_err(|e| format!("'{}': {}", v, e)))
}

fn parsed<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    matches
        .value_of(name)
        .map(|v| v.parse().map_err(|e| format!("--{} '{}': {}", name, v, e)))
        .transpose()
}

fn load_config(matches: &ArgMatches) -> Result<SimConfig, String> {
    let mut config = match matches.value_of("config") {
        Some(path) => SimConfig::from_json_file(path).map_err(|e| format!("{}: {}", path, e))?,
        None => SimConfig::default(),
    };

    if let Some(floors) = parsed(matches, "floors")? {
        config.floors = floors;
    }
    if let Some(elevators) = parsed(matches, "elevators")? {
        config.elevators = elevators;
    }
    if let Some(ppm) = parsed(matches, "people-per-minute")? {
        config.production.people_per_minute = ppm;
    }
    if let Some(duration) = parsed(matches, "duration-ms")? {
        config.production.duration_ms = duration;
    }
    if let Some(seed) = parsed(matches, "seed")? {
        config.production.seed = Some(seed);
    }
    Ok(config)
}

fn secs(ms: Option<u64>) -> String {
    ms.map(|ms| format!("{}s", round_secs(ms))).unwrap_or_else(|| "-".to_string())
}

fn print_report(config: &SimConfig, report: &SimulationReport) {
    println!("{}", "🛗 Elevator Simulation Report".bright_blue().bold());
    println!(
        "{} floors, {} elevators, capacity {}",
        config.floors, config.elevators, config.max_capacity
    );
    println!();

    println!("{}", "Wait times by floor".bright_white().bold());
    println!("{:>6} {:>6} {:>8} {:>8} {:>8}", "Floor", "Count", "Avg", "Min", "Max");
    for floor in &report.wait_by_floor {
        match &floor.wait {
            Some(wait) => println!(
                "{:>6} {:>6} {:>8} {:>8} {:>8}",
                floor.floor,
                wait.count,
                secs(Some(wait.average_ms)),
                secs(Some(wait.min_ms)),
                secs(Some(wait.max_ms))
            ),
            None => println!("{:>6} {:>6} {:>8} {:>8} {:>8}", floor.floor, 0, "-", "-", "-"),
        }
    }
    println!();

    println!("{}", "Ride times by trip".bright_white().bold());
    println!("{:>6} {:>6} {:>6} {:>8} {:>8} {:>8}", "From", "To", "Count", "Avg", "Min", "Max");
    for trip in &report.ride_by_trip {
        println!(
            "{:>6} {:>6} {:>6} {:>8} {:>8} {:>8}",
            trip.source,
            trip.destination,
            trip.ride.count,
            secs(Some(trip.ride.average_ms)),
            secs(Some(trip.ride.min_ms)),
            secs(Some(trip.ride.max_ms))
        );
    }
    println!();

    println!("{}", "Passengers".bright_white().bold());
    println!("{:>6} {:>6} {:>6} {:>8} {:>8} {:>8}", "Id", "From", "To", "Wait", "Ride", "Total");
    for passenger in &report.passengers {
        println!(
            "{:>6} {:>6} {:>6} {:>8} {:>8} {:>8}",
            passenger.id,
            passenger.source,
            passenger.destination,
            secs(passenger.wait_ms),
            secs(passenger.ride_ms),
            secs(passenger.total_ms())
        );
    }
    println!();

    let summary = format!("{} of {} passengers served", report.served(), report.total_passengers);
    if report.unserved == 0 {
        println!("{} {}", "✅".green(), summary.bright_green());
    } else {
        println!("{} {} ({} unserved)", "⚠️".yellow(), summary.bright_yellow(), report.unserved);
    }
}
