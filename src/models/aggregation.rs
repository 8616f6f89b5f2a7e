//! Derived, never persisted: recomputed from a user's segments on each query

use serde::{Deserialize, Serialize};

use super::trip::FlightSegment;

/// Two legs of one journey: `to` leaves from where `from` landed, within the
/// layover window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectingPair {
    pub from: FlightSegment,
    pub to: FlightSegment,
}

impl ConnectingPair {
    /// Seconds on the ground between the two legs
    pub fn layover_secs(&self) -> i64 {
        self.to.departure_time - self.from.arrival_time
    }
}

/// Flight count for one month or year slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightBucket {
    /// `"01"`..`"12"` for months, the four-digit year otherwise
    pub label: String,
    pub count: usize,
    /// Sum of `count` across every bucket of the same query
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
    pub label: String,
    /// Distinct destination airports in this country
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub flights: Vec<FlightBucket>,
    pub airlines: Vec<AirlineCount>,
    pub countries: Vec<CountryCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MileageSummary {
    pub total_hours: f64,
    pub total_kilometers: i64,
}
