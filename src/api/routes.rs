use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::TripsConfig;
use crate::storage::TripStore;
use crate::timezone::TimezoneTable;

use super::handlers::{
    create_place, create_trip, delete_place, delete_trip, draft_trips, get_connections,
    get_mileage, get_place, get_place_stats, get_statistics, get_timeline, get_trip,
    get_visited_countries, health_check, list_places, list_trips, update_place, update_trip,
    AppState,
};

pub fn create_api_router(
    storage: Arc<dyn TripStore>,
    timezones: Arc<TimezoneTable>,
    trips: TripsConfig,
) -> Router {
    let state = Arc::new(AppState {
        storage,
        timezones,
        trips,
    });

    let api_routes = Router::new()
        .route("/users/{user_id}/trips", get(list_trips).post(create_trip))
        .route(
            "/users/{user_id}/trips/{trip_id}",
            get(get_trip).put(update_trip).delete(delete_trip),
        )
        .route("/users/{user_id}/connections", get(get_connections))
        .route("/users/{user_id}/statistics", get(get_statistics))
        .route("/users/{user_id}/mileage", get(get_mileage))
        .route("/users/{user_id}/countries", get(get_visited_countries))
        .route("/users/{user_id}/places", get(list_places).post(create_place))
        .route("/users/{user_id}/places/stats", get(get_place_stats))
        .route(
            "/users/{user_id}/places/{place_id}",
            get(get_place).put(update_place).delete(delete_place),
        )
        .route("/users/{user_id}/timeline", get(get_timeline))
        .route("/flights/draft", post(draft_trips))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
}
