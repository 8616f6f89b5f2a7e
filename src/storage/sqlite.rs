use crate::models::{Airport, Coordinates, FlightSegment, NewPlace, NewTrip, Place, PlaceChanges};
use crate::storage::{StorageError, StorageResult, TripStore};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

const TRIP_COLUMNS: &str = r#"
    SELECT
        t.id,
        t.user_id,
        t.departure,
        t.arrival,
        t.departure_time,
        t.arrival_time,
        t.airline,
        t.flight_number,
        t.reservation,
        t.terminal,
        t.gate,
        d.latitude AS departure_lat,
        d.longitude AS departure_lon,
        a.latitude AS arrival_lat,
        a.longitude AS arrival_lon,
        a.country AS arrival_country
    FROM trips t
    JOIN airports d ON t.departure = d.iata_code
    JOIN airports a ON t.arrival = a.iata_code
"#;

const PLACE_COLUMNS: &str = r#"
    SELECT
        id, user_id, place_id, name, address, latitude, longitude,
        visit_date, category, notes, marker_color, created_at, updated_at
    FROM places
"#;

#[derive(Debug, FromRow)]
struct TripRow {
    id: i64,
    user_id: i64,
    departure: String,
    arrival: String,
    departure_time: i64,
    arrival_time: i64,
    airline: String,
    flight_number: String,
    reservation: Option<String>,
    terminal: Option<String>,
    gate: Option<String>,
    departure_lat: f64,
    departure_lon: f64,
    arrival_lat: f64,
    arrival_lon: f64,
    arrival_country: String,
}

impl From<TripRow> for FlightSegment {
    fn from(row: TripRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            departure_code: row.departure,
            arrival_code: row.arrival,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            airline: row.airline,
            flight_number: row.flight_number,
            reservation: row.reservation,
            terminal: row.terminal,
            gate: row.gate,
            departure_coordinates: Coordinates::new(row.departure_lat, row.departure_lon),
            arrival_coordinates: Coordinates::new(row.arrival_lat, row.arrival_lon),
            arrival_country: row.arrival_country,
        }
    }
}

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let mut options = SqlitePoolOptions::new().max_connections(max_connections);

        // Every connection to :memory: is its own database
        if database_url.contains(":memory:") {
            options = options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = options.connect(database_url).await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn airport_exists(&self, code: &str) -> StorageResult<bool> {
        let found = sqlx::query_scalar::<_, String>("SELECT iata_code FROM airports WHERE iata_code = ?")
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| StorageError::Other(e.into()))?;

        Ok(found.is_some())
    }

    async fn ensure_airports(&self, trip: &NewTrip) -> StorageResult<()> {
        for code in [&trip.departure_code, &trip.arrival_code] {
            if !self.airport_exists(code).await? {
                return Err(StorageError::UnknownAirport(code.clone()));
            }
        }
        Ok(())
    }

    async fn fetch_trip(&self, user_id: i64, trip_id: i64) -> StorageResult<FlightSegment> {
        let row = sqlx::query_as::<_, TripRow>(&format!(
            "{TRIP_COLUMNS} WHERE t.id = ? AND t.user_id = ?"
        ))
        .bind(trip_id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        row.map(FlightSegment::from).ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl TripStore for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS airports (
                iata_code TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                country TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                region TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trips (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                departure TEXT NOT NULL,
                arrival TEXT NOT NULL,
                departure_time INTEGER NOT NULL,
                arrival_time INTEGER NOT NULL,
                airline TEXT NOT NULL,
                flight_number TEXT NOT NULL,
                reservation TEXT,
                terminal TEXT,
                gate TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_trips_user_id ON trips(user_id)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS places (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                place_id TEXT NOT NULL,
                name TEXT NOT NULL,
                address TEXT,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                visit_date INTEGER NOT NULL,
                category TEXT,
                notes TEXT,
                marker_color TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_places_user_id ON places(user_id)")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn upsert_airport(&self, airport: &Airport) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO airports (iata_code, name, country, latitude, longitude, region)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(iata_code) DO UPDATE SET
                name = excluded.name,
                country = excluded.country,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                region = excluded.region
            "#,
        )
        .bind(airport.iata_code.trim().to_ascii_uppercase())
        .bind(&airport.name)
        .bind(&airport.country)
        .bind(airport.latitude)
        .bind(airport.longitude)
        .bind(&airport.region)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        Ok(())
    }

    async fn create_trip(&self, trip: &NewTrip) -> StorageResult<FlightSegment> {
        self.ensure_airports(trip).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO trips
            (user_id, departure, arrival, departure_time, arrival_time, airline, flight_number, reservation, terminal, gate)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(trip.user_id)
        .bind(&trip.departure_code)
        .bind(&trip.arrival_code)
        .bind(trip.departure_time)
        .bind(trip.arrival_time)
        .bind(&trip.airline)
        .bind(&trip.flight_number)
        .bind(&trip.reservation)
        .bind(&trip.terminal)
        .bind(&trip.gate)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        self.fetch_trip(trip.user_id, result.last_insert_rowid()).await
    }

    async fn get_trip(&self, user_id: i64, trip_id: i64) -> StorageResult<FlightSegment> {
        self.fetch_trip(user_id, trip_id).await
    }

    async fn update_trip(&self, trip_id: i64, trip: &NewTrip) -> StorageResult<FlightSegment> {
        self.ensure_airports(trip).await?;

        let result = sqlx::query(
            r#"
            UPDATE trips
            SET departure = ?, arrival = ?, departure_time = ?, arrival_time = ?,
                airline = ?, flight_number = ?, reservation = ?, terminal = ?, gate = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&trip.departure_code)
        .bind(&trip.arrival_code)
        .bind(trip.departure_time)
        .bind(trip.arrival_time)
        .bind(&trip.airline)
        .bind(&trip.flight_number)
        .bind(&trip.reservation)
        .bind(&trip.terminal)
        .bind(&trip.gate)
        .bind(trip_id)
        .bind(trip.user_id)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        self.fetch_trip(trip.user_id, trip_id).await
    }

    async fn delete_trip(&self, user_id: i64, trip_id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM trips WHERE id = ? AND user_id = ?")
            .bind(trip_id)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| StorageError::Other(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn trips_for_user(&self, user_id: i64) -> StorageResult<Vec<FlightSegment>> {
        let rows = sqlx::query_as::<_, TripRow>(&format!(
            "{TRIP_COLUMNS} WHERE t.user_id = ? ORDER BY t.id"
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        Ok(rows.into_iter().map(FlightSegment::from).collect())
    }

    async fn create_place(&self, place: &NewPlace) -> StorageResult<Place> {
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO places
            (user_id, place_id, name, address, latitude, longitude, visit_date, category, notes, marker_color, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(place.user_id)
        .bind(&place.place_id)
        .bind(&place.name)
        .bind(&place.address)
        .bind(place.latitude)
        .bind(place.longitude)
        .bind(place.visit_date)
        .bind(&place.category)
        .bind(&place.notes)
        .bind(&place.marker_color)
        .bind(now)
        .bind(now)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        self.get_place(place.user_id, result.last_insert_rowid()).await
    }

    async fn places_for_user(&self, user_id: i64) -> StorageResult<Vec<Place>> {
        sqlx::query_as::<_, Place>(&format!(
            "{PLACE_COLUMNS} WHERE user_id = ? ORDER BY visit_date DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))
    }

    async fn get_place(&self, user_id: i64, place_id: i64) -> StorageResult<Place> {
        let place = sqlx::query_as::<_, Place>(&format!(
            "{PLACE_COLUMNS} WHERE id = ? AND user_id = ?"
        ))
        .bind(place_id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        place.ok_or(StorageError::NotFound)
    }

    async fn update_place(
        &self,
        user_id: i64,
        place_id: i64,
        changes: &PlaceChanges,
    ) -> StorageResult<Place> {
        let result = sqlx::query(
            r#"
            UPDATE places
            SET name = ?, address = ?, visit_date = ?, category = ?,
                notes = ?, marker_color = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.address)
        .bind(changes.visit_date)
        .bind(&changes.category)
        .bind(&changes.notes)
        .bind(&changes.marker_color)
        .bind(Utc::now().timestamp())
        .bind(place_id)
        .bind(user_id)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        self.get_place(user_id, place_id).await
    }

    async fn delete_place(&self, user_id: i64, place_id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM places WHERE id = ? AND user_id = ?")
            .bind(place_id)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| StorageError::Other(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
