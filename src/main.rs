//! Air-Quality Monitor - command-line front-end
//!
//! Browses the GIOS station catalog, saves sensor readings to the local
//! database, and analyzes what has been saved.
//!
//! Usage:
//!   cargo run -- stations --city wrocław
//!   cargo run -- sensors 114
//!   cargo run -- save 114 642
//!   cargo run -- analyze 642 --from "2024-06-01" --to "2024-06-30"
//!
//! Environment:
//!   AIRMON_API_URL - pjp-api base URL (default: public GIOS endpoint)
//!   AIRMON_DB_PATH - SQLite database file
//!   RUST_LOG       - log filter (default: airmon_service=info)

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use airmon_service::config::AppConfig;
use airmon_service::model::{parse_timestamp, Timestamp, TIMESTAMP_FORMAT};
use airmon_service::monitor::{Monitor, SaveOutcome, Session};

#[derive(Parser, Debug)]
#[command(name = "airmon", version, about = "Air-quality sensor monitor", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: ./airmon.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database path (overrides config and environment).
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// API base URL (overrides config and environment).
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stations from the network, optionally filtered by city.
    Stations {
        #[arg(long)]
        city: Option<String>,
    },
    /// List sensors installed at a station.
    Sensors { station_id: i64 },
    /// Show the current reading of a sensor without saving it.
    Fetch { station_id: i64, sensor_id: i64 },
    /// Fetch the current reading of a sensor and save it.
    Save { station_id: i64, sensor_id: i64 },
    /// List saved stations and their sensors.
    Stored,
    /// Dates available for a saved sensor.
    Dates { sensor_id: i64 },
    /// Analyze a saved sensor's series.
    Analyze {
        sensor_id: i64,
        #[arg(long, value_parser = parse_bound)]
        from: Option<Timestamp>,
        #[arg(long, value_parser = parse_bound)]
        to: Option<Timestamp>,
    },
    /// Air-quality index for a station (raw JSON).
    Index { station_id: i64 },
    /// Delete all saved data.
    Clear,
    /// Print every table.
    Dump,
}

fn parse_bound(raw: &str) -> Result<Timestamp, String> {
    parse_timestamp(raw).ok_or_else(|| format!("unrecognised date '{}'", raw))
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("airmon_service=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_overrides(
        args.api_url,
        args.database.map(|p| p.to_string_lossy().into_owned()),
    );

    let mut monitor = Monitor::from_config(&config)?;
    let mut session = Session::new();

    match args.command {
        Command::Stations { city } => {
            let stations = match city {
                Some(city) => monitor.lookup_city(&city),
                None => monitor.list_stations(),
            }
            .map_err(unavailable)?;

            if stations.is_empty() {
                println!("No stations found.");
            }
            for s in &stations {
                println!("{:>6}  {:<40} {:<20} ({:.5}, {:.5})", s.id, s.name, s.city, s.latitude, s.longitude);
            }
        }

        Command::Sensors { station_id } => {
            let sensors = monitor.list_sensors(station_id).map_err(unavailable)?;
            if sensors.is_empty() {
                println!("Station {} has no sensors.", station_id);
            }
            for s in &sensors {
                println!("{:>6}  {}", s.id, s.param_name);
            }
        }

        Command::Fetch { station_id, sensor_id } => {
            show_reading(&monitor, &mut session, station_id, sensor_id)?;
        }

        Command::Save { station_id, sensor_id } => {
            show_reading(&monitor, &mut session, station_id, sensor_id)?;
            match monitor.save_measurement(&session) {
                SaveOutcome::Saved => println!("\n✓ The current data has been saved to the database."),
                SaveOutcome::NothingToSave => println!("\nNo data to save."),
                SaveOutcome::Failed => {
                    eprintln!("\n✗ Saving failed; see log for details.");
                    std::process::exit(1);
                }
            }
        }

        Command::Stored => {
            let stations = monitor.stored_stations();
            if stations.is_empty() {
                println!("No saved stations.");
            }
            for station in &stations {
                println!("{:>6}  {}", station.id, station.name);
                for sensor in monitor.stored_sensors(station.id) {
                    println!("        {:>6} - {}", sensor.id, sensor.param_name);
                }
            }
        }

        Command::Dates { sensor_id } => {
            for date in monitor.available_dates(sensor_id) {
                println!("{}", date.format(TIMESTAMP_FORMAT));
            }
        }

        Command::Analyze { sensor_id, from, to } => {
            let (param_name, station_name) = monitor
                .sensor_info(sensor_id)
                .unwrap_or_else(|| ("Unknown Sensor".to_string(), "Unknown Station".to_string()));

            match monitor.analyze(sensor_id, from, to) {
                Some(a) => {
                    println!("{} at {}", param_name, station_name);
                    println!("Minimum Value: {} (Date: {})", a.min_value, a.min_timestamp.format(TIMESTAMP_FORMAT));
                    println!("Maximum Value: {} (Date: {})", a.max_value, a.max_timestamp.format(TIMESTAMP_FORMAT));
                    println!("Average Value: {:.2}", a.mean_value);
                    println!("Trend: {}", a.trend);
                }
                None => println!("No data found for sensor {}.", sensor_id),
            }
        }

        Command::Index { station_id } => {
            let index = monitor.fetch_air_quality_index(station_id).map_err(unavailable)?;
            println!("{}", serde_json::to_string_pretty(&index)?);
        }

        Command::Clear => {
            if monitor.clear_all() {
                println!("All data has been cleared from the database.");
            } else {
                eprintln!("Clearing failed; see log for details.");
                std::process::exit(1);
            }
        }

        Command::Dump => {
            if let Some(dump) = monitor.dump() {
                println!("{}", serde_json::to_string_pretty(&dump)?);
            }
        }
    }

    Ok(())
}

/// Resolve a station and sensor by id from the remote catalog and load the
/// sensor's current reading into the session.
fn select(monitor: &Monitor, session: &mut Session, station_id: i64, sensor_id: i64) -> Result<(), Box<dyn Error>> {
    let station = monitor
        .list_stations()
        .map_err(unavailable)?
        .into_iter()
        .find(|s| s.id == station_id)
        .ok_or_else(|| format!("station {} not found", station_id))?;

    let sensor = monitor
        .select_station(session, station)
        .map_err(unavailable)?
        .into_iter()
        .find(|s| s.id == sensor_id)
        .ok_or_else(|| format!("sensor {} not found at station {}", sensor_id, station_id))?;

    monitor.select_sensor(session, sensor).map_err(unavailable)?;
    Ok(())
}

/// Select the sensor and print its pending reading.
fn show_reading(monitor: &Monitor, session: &mut Session, station_id: i64, sensor_id: i64) -> Result<(), Box<dyn Error>> {
    select(monitor, session, station_id, sensor_id)?;

    match &session.pending {
        Some(entry) => {
            println!("Current Value: {}\nDate: {}", entry.value, entry.timestamp.format(TIMESTAMP_FORMAT));
            match (entry.historical_value, entry.historical_timestamp) {
                (Some(v), Some(t)) => println!("\nHistorical Value: {}\nDate: {}", v, t.format(TIMESTAMP_FORMAT)),
                _ => println!("\nNo historical data available."),
            }
        }
        None => println!("No data available."),
    }
    Ok(())
}

fn unavailable(e: airmon_service::error::FetchError) -> Box<dyn Error> {
    format!("upstream unavailable, try again later ({})", e).into()
}
