use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

use super::trip::FlightSegment;

/// A visited point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Place {
    pub id: i64,
    pub user_id: i64,
    /// Provider place id from the search that found it
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Midnight UTC of the visit day
    pub visit_date: i64,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub marker_color: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlace {
    pub user_id: i64,
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub visit_date: i64,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub marker_color: String,
}

/// Editable fields of a stored place; location and provider id are fixed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceChanges {
    pub name: String,
    pub address: Option<String>,
    pub visit_date: i64,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub marker_color: String,
}

/// Place form submission; `visit_date` is `YYYY-MM-DD`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePlaceRequest {
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub visit_date: String,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub marker_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePlaceRequest {
    pub name: String,
    pub address: Option<String>,
    pub visit_date: String,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub marker_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceStats {
    pub total_places: usize,
    /// Places per category; uncategorized places only count towards the total
    pub categories: BTreeMap<String, usize>,
}

/// One entry of the combined place and trip history
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimelineItem {
    Place { place: Place, timestamp: i64 },
    Trip { trip: FlightSegment, timestamp: i64 },
}

impl TimelineItem {
    /// Visit date for places, departure time for trips
    pub fn timestamp(&self) -> i64 {
        match self {
            TimelineItem::Place { timestamp, .. } | TimelineItem::Trip { timestamp, .. } => {
                *timestamp
            }
        }
    }
}
