use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One logged flight leg, already joined with its airports
///
/// Times are UTC seconds since the epoch. `arrival_time > departure_time` is
/// assumed, not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSegment {
    pub id: i64,
    pub user_id: i64,
    pub departure_code: String,
    pub arrival_code: String,
    pub departure_time: i64,
    pub arrival_time: i64,
    pub airline: String,
    pub flight_number: String,
    pub reservation: Option<String>,
    pub terminal: Option<String>,
    pub gate: Option<String>,
    pub departure_coordinates: Coordinates,
    pub arrival_coordinates: Coordinates,
    /// Country of the arrival airport
    pub arrival_country: String,
}

impl FlightSegment {
    /// Flight duration in seconds
    pub fn duration_secs(&self) -> i64 {
        self.arrival_time - self.departure_time
    }
}

/// A segment ready to be stored; times already normalized to UTC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrip {
    pub user_id: i64,
    pub departure_code: String,
    pub arrival_code: String,
    pub departure_time: i64,
    pub arrival_time: i64,
    pub airline: String,
    pub flight_number: String,
    pub reservation: Option<String>,
    pub terminal: Option<String>,
    pub gate: Option<String>,
}

/// Trip form submission with local wall-clock times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTripRequest {
    pub departure: String,
    pub arrival: String,
    /// Local departure time, `YYYY-MM-DDThh:mm`
    pub departure_time: String,
    /// Local arrival time, `YYYY-MM-DDThh:mm`
    pub arrival_time: String,
    /// Browser-reported zone, used only for airports missing from the table
    pub timezone: Option<String>,
    pub airline: String,
    pub flight_number: String,
    pub reservation: Option<String>,
    pub terminal: Option<String>,
    pub gate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Airport {
    pub iata_code: String,
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region: Option<String>,
}

impl Airport {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}
