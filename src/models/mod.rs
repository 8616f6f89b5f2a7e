pub mod aggregation;
pub mod flight_lookup;
pub mod place;
pub mod trip;

pub use aggregation::{
    AirlineCount, Aggregation, ConnectingPair, CountryCount, FlightBucket, MileageSummary,
};
pub use place::{
    CreatePlaceRequest, NewPlace, Place, PlaceChanges, PlaceStats, TimelineItem,
    UpdatePlaceRequest,
};
pub use trip::{Airport, Coordinates, CreateTripRequest, FlightSegment, NewTrip};
