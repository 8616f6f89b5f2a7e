use crate::models::{Coordinates, FlightSegment, MileageSummary};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers
pub fn haversine_km(from: &Coordinates, to: &Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Total airborne hours and estimated distance over every segment
///
/// Per-segment distances are summed as floats and only the final sum is
/// truncated to whole kilometers. Hours stay fractional.
pub fn mileage(segments: &[FlightSegment]) -> MileageSummary {
    let (seconds, kilometers) = segments.iter().fold((0i64, 0.0f64), |(secs, km), s| {
        (
            secs + s.duration_secs(),
            km + haversine_km(&s.departure_coordinates, &s.arrival_coordinates),
        )
    });

    MileageSummary {
        total_hours: seconds as f64 / 3600.0,
        total_kilometers: kilometers.trunc() as i64,
    }
}
