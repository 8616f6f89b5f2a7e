pub mod api;
pub mod config;
pub mod itinerary;
pub mod models;
pub mod places;
pub mod stats;
pub mod storage;
pub mod timezone;
