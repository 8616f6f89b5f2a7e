use crate::models::{Airport, FlightSegment, NewPlace, NewTrip, Place, PlaceChanges};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("not found")]
    NotFound,
    #[error("unknown airport code {0}")]
    UnknownAirport(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait TripStore: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn init(&self) -> Result<()>;

    /// Insert or replace an airport row
    async fn upsert_airport(&self, airport: &Airport) -> StorageResult<()>;

    /// Store a new segment; both airports must already exist
    async fn create_trip(&self, trip: &NewTrip) -> StorageResult<FlightSegment>;

    /// One of the user's segments, joined like `trips_for_user`
    async fn get_trip(&self, user_id: i64, trip_id: i64) -> StorageResult<FlightSegment>;

    /// Replace every field of one of `trip.user_id`'s segments
    async fn update_trip(&self, trip_id: i64, trip: &NewTrip) -> StorageResult<FlightSegment>;

    /// Delete one of the user's segments
    async fn delete_trip(&self, user_id: i64, trip_id: i64) -> StorageResult<()>;

    /// All of a user's segments joined with airport coordinates and the
    /// arrival country, ordered by id
    async fn trips_for_user(&self, user_id: i64) -> StorageResult<Vec<FlightSegment>>;

    async fn create_place(&self, place: &NewPlace) -> StorageResult<Place>;

    /// A user's places, most recent visit first
    async fn places_for_user(&self, user_id: i64) -> StorageResult<Vec<Place>>;

    async fn get_place(&self, user_id: i64, place_id: i64) -> StorageResult<Place>;

    async fn update_place(
        &self,
        user_id: i64,
        place_id: i64,
        changes: &PlaceChanges,
    ) -> StorageResult<Place>;

    async fn delete_place(&self, user_id: i64, place_id: i64) -> StorageResult<()>;
}
