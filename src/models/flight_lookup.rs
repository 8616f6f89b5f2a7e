//! Response model of the third-party flight-data lookup
//!
//! Only the fields used to prefill the trip form are typed; everything else in
//! the payload is ignored on deserialization.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::trip::CreateTripRequest;
use crate::timezone::LOCAL_DATETIME_FORMAT;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlightLookupResponse {
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub data: Vec<Flight>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
    pub count: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Flight {
    pub flight_date: Option<String>,
    pub flight_status: Option<String>,
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub airline: FlightAirline,
    #[serde(rename = "flight")]
    pub info: FlightInfo,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlightEndpoint {
    pub airport: Option<String>,
    pub timezone: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
    pub terminal: Option<String>,
    pub gate: Option<String>,
    /// Scheduled wall-clock time at this airport
    pub scheduled: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlightAirline {
    pub name: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlightInfo {
    pub number: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
    /// Shape varies by provider and is never inspected
    #[serde(default)]
    pub codeshared: Option<serde_json::Value>,
}

impl Flight {
    /// Prefilled trip form for this flight
    ///
    /// Scheduled times keep the wall clock they were reported in, so the
    /// submitted form goes through the usual local-time normalization.
    pub fn to_trip_draft(&self) -> CreateTripRequest {
        let local = |endpoint: &FlightEndpoint| {
            endpoint
                .scheduled
                .map(|at| at.format(LOCAL_DATETIME_FORMAT).to_string())
                .unwrap_or_default()
        };

        CreateTripRequest {
            departure: self.departure.iata.clone().unwrap_or_default(),
            arrival: self.arrival.iata.clone().unwrap_or_default(),
            departure_time: local(&self.departure),
            arrival_time: local(&self.arrival),
            timezone: self.departure.timezone.clone(),
            airline: self.airline.name.clone().unwrap_or_default(),
            flight_number: self.info.number.clone().unwrap_or_default(),
            reservation: None,
            terminal: self.departure.terminal.clone(),
            gate: self.departure.gate.clone(),
        }
    }
}
