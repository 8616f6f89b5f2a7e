use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::stats::{DEFAULT_TRAILING_YEARS, MAX_TRAILING_YEARS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    pub timezones: TimezoneConfig,
    pub cache: CacheConfig,
    pub trips: TripsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimezoneConfig {
    /// Airport to timezone JSON dataset, loaded once at startup
    pub data_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub max_entries: u64,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TripsConfig {
    /// How far ahead "upcoming" trip listings look
    pub upcoming_window_secs: i64,
    /// Years before the current one covered by yearly statistics
    pub stats_trailing_years: u32,
}

impl Default for TripsConfig {
    fn default() -> Self {
        Self {
            upcoming_window_secs: TripsConfig::DEFAULT_UPCOMING_WINDOW_SECS,
            stats_trailing_years: DEFAULT_TRAILING_YEARS,
        }
    }
}

impl TripsConfig {
    pub const DEFAULT_UPCOMING_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./triplog.db?mode=rwc".to_string());
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let timezone_data_path = std::env::var("TIMEZONE_DATA_PATH")
            .unwrap_or_else(|_| "./static/data/airport2timezone.json".to_string());

        let cache_max_entries = std::env::var("CACHE_MAX_ENTRIES")
            .unwrap_or_else(|_| "10000".to_string())
            .parse::<u64>()
            .context("CACHE_MAX_ENTRIES must be a positive integer")?;
        let cache_ttl_secs = std::env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()
            .context("CACHE_TTL_SECS must be a positive integer")?;

        let upcoming_window_secs = match std::env::var("UPCOMING_WINDOW_SECS") {
            Ok(v) => v
                .parse::<i64>()
                .context("UPCOMING_WINDOW_SECS must be an integer")?,
            Err(_) => TripsConfig::DEFAULT_UPCOMING_WINDOW_SECS,
        };
        let stats_trailing_years =
            parse_trailing_years(std::env::var("STATS_TRAILING_YEARS").ok().as_deref())?;

        Ok(Config {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            timezones: TimezoneConfig {
                data_path: timezone_data_path,
            },
            cache: CacheConfig {
                max_entries: cache_max_entries,
                ttl_secs: cache_ttl_secs,
            },
            trips: TripsConfig {
                upcoming_window_secs,
                stats_trailing_years,
            },
        })
    }
}

fn parse_trailing_years(raw: Option<&str>) -> anyhow::Result<u32> {
    let years = match raw {
        Some(v) => v
            .parse::<u32>()
            .context("STATS_TRAILING_YEARS must be a positive integer")?,
        None => DEFAULT_TRAILING_YEARS,
    };
    anyhow::ensure!(
        (1..=MAX_TRAILING_YEARS).contains(&years),
        "STATS_TRAILING_YEARS must be between 1 and {}",
        MAX_TRAILING_YEARS
    );
    Ok(years)
}
