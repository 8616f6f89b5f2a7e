//! Upcoming/past trip filters for trip listings

use crate::models::FlightSegment;

/// Segments departing strictly after `now` and strictly before
/// `now + window_secs`, soonest first
pub fn upcoming(segments: &[FlightSegment], now: i64, window_secs: i64) -> Vec<FlightSegment> {
    let horizon = now.saturating_add(window_secs);
    let mut trips: Vec<FlightSegment> = segments
        .iter()
        .filter(|s| s.departure_time > now && s.departure_time < horizon)
        .cloned()
        .collect();
    trips.sort_by_key(|s| s.departure_time);
    trips
}

/// Segments that already departed, most recent first
pub fn past(segments: &[FlightSegment], now: i64) -> Vec<FlightSegment> {
    let mut trips: Vec<FlightSegment> = segments
        .iter()
        .filter(|s| s.departure_time <= now)
        .cloned()
        .collect();
    trips.sort_by(|a, b| b.departure_time.cmp(&a.departure_time));
    trips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    const NOW: i64 = 1_700_000_000;
    const DAY: i64 = 86_400;
    const WEEK: i64 = 7 * DAY;

    fn departing(id: i64, departure: i64) -> FlightSegment {
        FlightSegment {
            id,
            user_id: 1,
            departure_code: "JFK".to_string(),
            arrival_code: "LAX".to_string(),
            departure_time: departure,
            arrival_time: departure + 6 * 3600,
            airline: "Test Air".to_string(),
            flight_number: "TA1".to_string(),
            reservation: None,
            terminal: None,
            gate: None,
            departure_coordinates: Coordinates::new(0.0, 0.0),
            arrival_coordinates: Coordinates::new(0.0, 0.0),
            arrival_country: "US".to_string(),
        }
    }

    fn ids(trips: &[FlightSegment]) -> Vec<i64> {
        trips.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_upcoming_respects_window() {
        let segments = vec![
            departing(1, NOW + 3 * DAY),
            departing(2, NOW),
            departing(3, NOW + 1),
            departing(4, NOW + WEEK),
            departing(5, NOW - DAY),
            departing(6, NOW + WEEK - 1),
        ];

        assert_eq!(ids(&upcoming(&segments, NOW, WEEK)), vec![3, 1, 6]);
    }

    #[test]
    fn test_upcoming_window_is_configurable() {
        let segments = vec![departing(1, NOW + 30 * DAY), departing(2, NOW + 2 * DAY)];

        assert_eq!(ids(&upcoming(&segments, NOW, WEEK)), vec![2]);
        assert_eq!(ids(&upcoming(&segments, NOW, 365 * DAY)), vec![2, 1]);
        assert!(upcoming(&segments, NOW, 0).is_empty());
    }

    #[test]
    fn test_past_most_recent_first() {
        let segments = vec![
            departing(1, NOW - 10 * DAY),
            departing(2, NOW + DAY),
            departing(3, NOW),
            departing(4, NOW - DAY),
        ];

        assert_eq!(ids(&past(&segments, NOW)), vec![3, 4, 1]);
    }
}
