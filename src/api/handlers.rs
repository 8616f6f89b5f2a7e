use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::config::TripsConfig;
use crate::itinerary::{self, Connections};
use crate::models::flight_lookup::FlightLookupResponse;
use crate::models::{
    Aggregation, CreatePlaceRequest, CreateTripRequest, FlightSegment, MileageSummary, NewPlace,
    NewTrip, Place, PlaceChanges, PlaceStats, TimelineItem, UpdatePlaceRequest,
};
use crate::places::{self, PlaceFilter};
use crate::stats::{self, Granularity, StatisticsAggregator};
use crate::storage::{StorageError, TripStore};
use crate::timezone::{LocalTimeNormalizer, SegmentTimezones, TimezoneTable};

pub struct AppState {
    pub storage: Arc<dyn TripStore>,
    pub timezones: Arc<TimezoneTable>,
    pub trips: TripsConfig,
}

impl AppState {
    fn aggregator(&self) -> StatisticsAggregator {
        StatisticsAggregator::new(self.trips.stats_trailing_years)
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn storage_error(e: StorageError, action: &str) -> ApiError {
    match e {
        StorageError::NotFound => api_error(
            StatusCode::NOT_FOUND,
            format!("Failed to {}: not found", action),
        ),
        StorageError::UnknownAirport(code) => api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Unknown airport code: {}", code),
        ),
        StorageError::Other(e) => {
            error!("Failed to {}: {}", action, e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {}", action),
            )
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripFilter {
    #[default]
    All,
    Upcoming,
    Past,
}

#[derive(Deserialize)]
pub struct TripListQuery {
    #[serde(default)]
    pub filter: TripFilter,
}

#[derive(Deserialize)]
pub struct StatisticsQuery {
    #[serde(default)]
    pub agg: String,
    pub year: Option<i32>,
}

/// A segment with both endpoints' zone ids for local-time display
#[derive(Serialize)]
pub struct TripView {
    #[serde(flatten)]
    pub trip: FlightSegment,
    pub timezones: SegmentTimezones,
}

#[derive(Deserialize)]
pub struct PlaceListQuery {
    pub year: Option<i32>,
    /// Comma-separated
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct VisitedCountriesResponse {
    pub countries: Vec<String>,
    pub total: usize,
}

/// Normalize both local form times, each with its own airport's zone
fn trip_from_request(
    state: &AppState,
    user_id: i64,
    payload: CreateTripRequest,
) -> Result<NewTrip, ApiError> {
    let departure = payload.departure.trim().to_ascii_uppercase();
    let arrival = payload.arrival.trim().to_ascii_uppercase();
    if departure.is_empty() || arrival.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Departure and arrival airports are required",
        ));
    }

    let normalizer = LocalTimeNormalizer::new(&state.timezones);
    let fallback = payload.timezone.as_deref().unwrap_or("UTC");
    let departure_time = normalizer
        .normalize(&payload.departure_time, &departure, fallback)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    let arrival_time = normalizer
        .normalize(&payload.arrival_time, &arrival, fallback)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(NewTrip {
        user_id,
        departure_code: departure,
        arrival_code: arrival,
        departure_time: departure_time.timestamp(),
        arrival_time: arrival_time.timestamp(),
        airline: payload.airline,
        flight_number: payload.flight_number,
        reservation: payload.reservation,
        terminal: payload.terminal,
        gate: payload.gate,
    })
}

/// Log a flight from local form times
pub async fn create_trip(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(payload): Json<CreateTripRequest>,
) -> Result<(StatusCode, Json<FlightSegment>), ApiError> {
    let new_trip = trip_from_request(&state, user_id, payload)?;

    match state.storage.create_trip(&new_trip).await {
        Ok(trip) => Ok((StatusCode::CREATED, Json(trip))),
        Err(e) => Err(storage_error(e, "create trip")),
    }
}

/// One trip with timezone annotations
pub async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path((user_id, trip_id)): Path<(i64, i64)>,
) -> Result<Json<TripView>, ApiError> {
    let trip = state
        .storage
        .get_trip(user_id, trip_id)
        .await
        .map_err(|e| storage_error(e, "get trip"))?;

    Ok(Json(TripView {
        timezones: state.timezones.annotate(&trip),
        trip,
    }))
}

/// Replace a trip from local form times
pub async fn update_trip(
    State(state): State<Arc<AppState>>,
    Path((user_id, trip_id)): Path<(i64, i64)>,
    Json(payload): Json<CreateTripRequest>,
) -> Result<Json<FlightSegment>, ApiError> {
    let changes = trip_from_request(&state, user_id, payload)?;

    match state.storage.update_trip(trip_id, &changes).await {
        Ok(trip) => Ok(Json(trip)),
        Err(e) => Err(storage_error(e, "update trip")),
    }
}

/// List a user's trips with timezone annotations
pub async fn list_trips(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(query): Query<TripListQuery>,
) -> Result<Json<Vec<TripView>>, ApiError> {
    let trips = state
        .storage
        .trips_for_user(user_id)
        .await
        .map_err(|e| storage_error(e, "get trips"))?;

    let now = Utc::now().timestamp();
    let trips = match query.filter {
        TripFilter::All => trips,
        TripFilter::Upcoming => itinerary::upcoming(&trips, now, state.trips.upcoming_window_secs),
        TripFilter::Past => itinerary::past(&trips, now),
    };

    let views = trips
        .into_iter()
        .map(|trip| TripView {
            timezones: state.timezones.annotate(&trip),
            trip,
        })
        .collect();

    Ok(Json(views))
}

/// Delete one of a user's trips
pub async fn delete_trip(
    State(state): State<Arc<AppState>>,
    Path((user_id, trip_id)): Path<(i64, i64)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    match state.storage.delete_trip(user_id, trip_id).await {
        Ok(()) => Ok(Json(SuccessResponse {
            message: "Trip deleted successfully".to_string(),
        })),
        Err(e) => Err(storage_error(e, "delete trip")),
    }
}

/// Standalone flights and connecting pairs
pub async fn get_connections(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Connections>, ApiError> {
    let trips = state
        .storage
        .trips_for_user(user_id)
        .await
        .map_err(|e| storage_error(e, "get trips"))?;

    let connections = itinerary::detect(&trips);
    debug!(
        "User {}: {} connecting pairs, {} standalone",
        user_id,
        connections.pairs.len(),
        connections.standalone.len()
    );

    Ok(Json(connections))
}

/// Flight, airline and country statistics for `agg=m` (months of `year`) or
/// `agg=y` (trailing years)
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Aggregation>, ApiError> {
    let granularity = query
        .agg
        .parse::<Granularity>()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let trips = state
        .storage
        .trips_for_user(user_id)
        .await
        .map_err(|e| storage_error(e, "get trips"))?;

    let now = Utc::now();
    let year = query.year.unwrap_or_else(|| now.year());

    let aggregation = state.aggregator().aggregate_by(&trips, granularity, year, now);
    Ok(Json(aggregation))
}

/// Total flight hours and great-circle kilometers
pub async fn get_mileage(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<MileageSummary>, ApiError> {
    let trips = state
        .storage
        .trips_for_user(user_id)
        .await
        .map_err(|e| storage_error(e, "get trips"))?;

    Ok(Json(stats::mileage(&trips)))
}

/// Countries the user has flown into
pub async fn get_visited_countries(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<VisitedCountriesResponse>, ApiError> {
    let trips = state
        .storage
        .trips_for_user(user_id)
        .await
        .map_err(|e| storage_error(e, "get trips"))?;

    let countries: Vec<String> = stats::visited_countries(&trips).into_iter().collect();
    let total = countries.len();
    Ok(Json(VisitedCountriesResponse { countries, total }))
}

/// Log a visited place
pub async fn create_place(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(payload): Json<CreatePlaceRequest>,
) -> Result<(StatusCode, Json<Place>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Place name is required"));
    }
    let visit_date = places::parse_visit_date(&payload.visit_date)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let new_place = NewPlace {
        user_id,
        place_id: payload.place_id,
        name: payload.name,
        address: payload.address,
        latitude: payload.latitude,
        longitude: payload.longitude,
        visit_date,
        category: payload.category,
        notes: payload.notes,
        marker_color: places::marker_color(payload.marker_color.as_deref()),
    };

    match state.storage.create_place(&new_place).await {
        Ok(place) => Ok((StatusCode::CREATED, Json(place))),
        Err(e) => Err(storage_error(e, "create place")),
    }
}

/// A user's places, optionally narrowed by visit year and categories
pub async fn list_places(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(query): Query<PlaceListQuery>,
) -> Result<Json<Vec<Place>>, ApiError> {
    let all = state
        .storage
        .places_for_user(user_id)
        .await
        .map_err(|e| storage_error(e, "get places"))?;

    let filter = PlaceFilter::new(query.year, query.category.as_deref());
    Ok(Json(filter.apply(all)))
}

pub async fn get_place(
    State(state): State<Arc<AppState>>,
    Path((user_id, place_id)): Path<(i64, i64)>,
) -> Result<Json<Place>, ApiError> {
    match state.storage.get_place(user_id, place_id).await {
        Ok(place) => Ok(Json(place)),
        Err(e) => Err(storage_error(e, "get place")),
    }
}

pub async fn update_place(
    State(state): State<Arc<AppState>>,
    Path((user_id, place_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdatePlaceRequest>,
) -> Result<Json<Place>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Place name is required"));
    }
    let visit_date = places::parse_visit_date(&payload.visit_date)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let changes = PlaceChanges {
        name: payload.name,
        address: payload.address,
        visit_date,
        category: payload.category,
        notes: payload.notes,
        marker_color: places::marker_color(payload.marker_color.as_deref()),
    };

    match state.storage.update_place(user_id, place_id, &changes).await {
        Ok(place) => Ok(Json(place)),
        Err(e) => Err(storage_error(e, "update place")),
    }
}

pub async fn delete_place(
    State(state): State<Arc<AppState>>,
    Path((user_id, place_id)): Path<(i64, i64)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    match state.storage.delete_place(user_id, place_id).await {
        Ok(()) => Ok(Json(SuccessResponse {
            message: "Place deleted successfully".to_string(),
        })),
        Err(e) => Err(storage_error(e, "delete place")),
    }
}

/// Total places and per-category counts
pub async fn get_place_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<PlaceStats>, ApiError> {
    let all = state
        .storage
        .places_for_user(user_id)
        .await
        .map_err(|e| storage_error(e, "get places"))?;

    Ok(Json(places::place_stats(&all)))
}

/// Places and trips together, newest first
pub async fn get_timeline(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<TimelineItem>>, ApiError> {
    let user_places = state
        .storage
        .places_for_user(user_id)
        .await
        .map_err(|e| storage_error(e, "get places"))?;
    let trips = state
        .storage
        .trips_for_user(user_id)
        .await
        .map_err(|e| storage_error(e, "get trips"))?;

    Ok(Json(places::timeline(user_places, trips)))
}

/// Prefilled trip forms from a flight lookup result
pub async fn draft_trips(Json(lookup): Json<FlightLookupResponse>) -> Json<Vec<CreateTripRequest>> {
    debug!("Drafting {} looked-up flights", lookup.data.len());
    Json(lookup.data.iter().map(|flight| flight.to_trip_draft()).collect())
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
