use crate::models::{Airport, FlightSegment, NewPlace, NewTrip, Place, PlaceChanges};
use crate::storage::{StorageResult, TripStore};
use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Read-through cache of each user's joined segment list
///
/// Statistics, connections and mileage all start from the full list, so one
/// cached fetch serves every view. A user's entry is dropped whenever one of
/// their trips changes; airport edits drop everything. Places are not cached.
pub struct CachedStorage {
    /// Underlying storage implementation
    inner: Arc<dyn TripStore>,
    /// Segments by user id
    trips_cache: Cache<i64, Arc<Vec<FlightSegment>>>,
}

impl CachedStorage {
    pub fn new(inner: Arc<dyn TripStore>, max_cache_entries: u64, ttl_secs: u64) -> Self {
        let trips_cache = Cache::builder()
            .max_capacity(max_cache_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner, trips_cache }
    }

    /// Whether a user's segments are currently cached
    pub async fn is_cached(&self, user_id: i64) -> bool {
        self.trips_cache.get(&user_id).await.is_some()
    }
}

#[async_trait]
impl TripStore for CachedStorage {
    async fn init(&self) -> Result<()> {
        self.inner.init().await
    }

    async fn upsert_airport(&self, airport: &Airport) -> StorageResult<()> {
        self.inner.upsert_airport(airport).await?;
        self.trips_cache.invalidate_all();
        Ok(())
    }

    async fn create_trip(&self, trip: &NewTrip) -> StorageResult<FlightSegment> {
        let created = self.inner.create_trip(trip).await?;
        self.trips_cache.invalidate(&trip.user_id).await;
        Ok(created)
    }

    async fn get_trip(&self, user_id: i64, trip_id: i64) -> StorageResult<FlightSegment> {
        self.inner.get_trip(user_id, trip_id).await
    }

    async fn update_trip(&self, trip_id: i64, trip: &NewTrip) -> StorageResult<FlightSegment> {
        let updated = self.inner.update_trip(trip_id, trip).await?;
        self.trips_cache.invalidate(&trip.user_id).await;
        Ok(updated)
    }

    async fn delete_trip(&self, user_id: i64, trip_id: i64) -> StorageResult<()> {
        self.inner.delete_trip(user_id, trip_id).await?;
        self.trips_cache.invalidate(&user_id).await;
        Ok(())
    }

    async fn trips_for_user(&self, user_id: i64) -> StorageResult<Vec<FlightSegment>> {
        if let Some(cached) = self.trips_cache.get(&user_id).await {
            return Ok(cached.as_ref().clone());
        }

        // Cache miss - fetch from underlying storage
        let trips = self.inner.trips_for_user(user_id).await?;
        self.trips_cache
            .insert(user_id, Arc::new(trips.clone()))
            .await;

        Ok(trips)
    }

    async fn create_place(&self, place: &NewPlace) -> StorageResult<Place> {
        self.inner.create_place(place).await
    }

    async fn places_for_user(&self, user_id: i64) -> StorageResult<Vec<Place>> {
        self.inner.places_for_user(user_id).await
    }

    async fn get_place(&self, user_id: i64, place_id: i64) -> StorageResult<Place> {
        self.inner.get_place(user_id, place_id).await
    }

    async fn update_place(
        &self,
        user_id: i64,
        place_id: i64,
        changes: &PlaceChanges,
    ) -> StorageResult<Place> {
        self.inner.update_place(user_id, place_id, changes).await
    }

    async fn delete_place(&self, user_id: i64, place_id: i64) -> StorageResult<()> {
        self.inner.delete_place(user_id, place_id).await
    }
}
