//! Airport to IANA timezone lookup
//!
//! The table is loaded once at startup from a static JSON dataset and is
//! read-only afterwards. Share it behind an `Arc`.

pub mod normalize;

pub use normalize::{LocalTimeNormalizer, ParseError, LOCAL_DATETIME_FORMAT};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::models::FlightSegment;

#[derive(Debug, Error)]
pub enum TimezoneDataError {
    #[error("failed to read timezone data from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("timezone data must be an array of airport records or a code-to-zone map")]
    Format(#[from] serde_json::Error),
}

/// One record of the array-shaped dataset
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportTimezone {
    pub code: String,
    #[serde(default)]
    pub country_code: Option<String>,
    pub timezone: String,
    #[serde(default)]
    pub offset: Option<UtcOffset>,
}

/// Hours from GMT, standard and daylight
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UtcOffset {
    pub gmt: f64,
    pub dst: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTable {
    Records(Vec<AirportTimezone>),
    Flat(HashMap<String, String>),
}

/// Zone identifiers attached to both ends of a segment for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentTimezones {
    pub departure: Option<String>,
    pub arrival: Option<String>,
}

/// Immutable airport code -> timezone id mapping
#[derive(Debug, Clone, Default)]
pub struct TimezoneTable {
    zones: HashMap<String, String>,
}

impl TimezoneTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let zones = entries
            .into_iter()
            .map(|(code, zone)| (normalize_code(code.as_ref()), zone.into()))
            .collect();
        Self { zones }
    }

    /// Parse either dataset shape into the flattened mapping
    pub fn from_json(bytes: &[u8]) -> Result<Self, TimezoneDataError> {
        let table = match serde_json::from_slice::<RawTable>(bytes)? {
            RawTable::Records(records) => {
                Self::new(records.into_iter().map(|r| (r.code, r.timezone)))
            }
            RawTable::Flat(map) => Self::new(map),
        };
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TimezoneDataError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TimezoneDataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&bytes)
    }

    /// Timezone id for an airport code, case-insensitive
    pub fn resolve(&self, code: &str) -> Option<&str> {
        self.zones.get(&normalize_code(code)).map(String::as_str)
    }

    pub fn annotate(&self, segment: &FlightSegment) -> SegmentTimezones {
        let lookup = |code: &str| {
            let zone = self.resolve(code).map(str::to_string);
            if zone.is_none() {
                warn!("No timezone found for airport: {}", code);
            }
            zone
        };

        SegmentTimezones {
            departure: lookup(&segment.departure_code),
            arrival: lookup(&segment.arrival_code),
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
