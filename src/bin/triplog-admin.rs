use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use triplog::config::Config;
use triplog::itinerary;
use triplog::models::Airport;
use triplog::stats::{self, StatisticsAggregator};
use triplog::storage::{SqliteStorage, TripStore};

#[derive(Parser)]
#[command(name = "triplog-admin")]
#[command(about = "Triplog maintenance and reporting CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert or update airports from a JSON array
    ImportAirports {
        /// Path to a JSON file of airport records
        path: String,
    },
    /// Print flight, airline and country statistics for a user
    Stats {
        user_id: i64,
        /// Aggregation granularity (y, m)
        #[arg(long, default_value = "y")]
        agg: String,
        /// Calendar year for monthly statistics (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Print standalone flights and connecting pairs for a user
    Connections { user_id: i64 },
    /// Print total flight hours and kilometers for a user
    Mileage { user_id: i64 },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage: Arc<dyn TripStore> = Arc::new(
        SqliteStorage::new(&config.database.url, config.database.max_connections).await?,
    );

    // Ensure database is initialized
    storage.init().await?;

    match cli.command {
        Commands::ImportAirports { path } => {
            let bytes = std::fs::read(&path).with_context(|| format!("Failed to read {}", path))?;
            let airports: Vec<Airport> = serde_json::from_slice(&bytes)
                .with_context(|| format!("{} is not a JSON array of airports", path))?;

            for airport in &airports {
                storage.upsert_airport(airport).await?;
            }
            println!("✓ Imported {} airports from '{}'", airports.len(), path);
        }
        Commands::Stats { user_id, agg, year } => {
            let trips = storage.trips_for_user(user_id).await?;
            let now = Utc::now();
            let aggregator = StatisticsAggregator::new(config.trips.stats_trailing_years);
            let aggregation =
                aggregator.aggregate(&trips, &agg, year.unwrap_or_else(|| now.year()), now)?;
            print_json(&aggregation)?;
        }
        Commands::Connections { user_id } => {
            let trips = storage.trips_for_user(user_id).await?;
            print_json(&itinerary::detect(&trips))?;
        }
        Commands::Mileage { user_id } => {
            let trips = storage.trips_for_user(user_id).await?;
            print_json(&stats::mileage(&trips))?;
        }
    }

    Ok(())
}
