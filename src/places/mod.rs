//! Visited places and the combined place/trip timeline

use chrono::{DateTime, Datelike, NaiveDate};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::{FlightSegment, Place, PlaceStats, TimelineItem};

/// Accepted `visit_date` layout
pub const VISIT_DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_MARKER_COLOR: &str = "#26e0b0";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid visit date {input:?}, expected YYYY-MM-DD")]
pub struct VisitDateError {
    pub input: String,
}

/// Midnight UTC of a `YYYY-MM-DD` date, as epoch seconds
pub fn parse_visit_date(input: &str) -> Result<i64, VisitDateError> {
    let error = || VisitDateError {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    let shaped = trimmed.len() == 10
        && trimmed.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(error());
    }

    let date = NaiveDate::parse_from_str(trimmed, VISIT_DATE_FORMAT).map_err(|_| error())?;
    date.and_hms_opt(0, 0, 0)
        .map(|at| at.and_utc().timestamp())
        .ok_or_else(error)
}

/// Blank or missing colors get the default marker color
pub fn marker_color(requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(color) if !color.is_empty() => color.to_string(),
        _ => DEFAULT_MARKER_COLOR.to_string(),
    }
}

/// Year and category selection for place listings
///
/// An empty category list matches every place, including uncategorized ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceFilter {
    pub year: Option<i32>,
    pub categories: Vec<String>,
}

impl PlaceFilter {
    /// Comma-separated categories, blanks dropped
    pub fn new(year: Option<i32>, categories: Option<&str>) -> Self {
        let categories = categories
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self { year, categories }
    }

    pub fn matches(&self, place: &Place) -> bool {
        let year_match = self.year.map_or(true, |year| {
            DateTime::from_timestamp(place.visit_date, 0).is_some_and(|at| at.year() == year)
        });
        let category_match = self.categories.is_empty()
            || place
                .category
                .as_ref()
                .is_some_and(|c| self.categories.iter().any(|wanted| wanted == c));

        year_match && category_match
    }

    pub fn apply(&self, places: Vec<Place>) -> Vec<Place> {
        places.into_iter().filter(|p| self.matches(p)).collect()
    }
}

pub fn place_stats(places: &[Place]) -> PlaceStats {
    let mut categories: BTreeMap<String, usize> = BTreeMap::new();
    for category in places.iter().filter_map(|p| p.category.as_ref()) {
        *categories.entry(category.clone()).or_default() += 1;
    }

    PlaceStats {
        total_places: places.len(),
        categories,
    }
}

/// Places and trips merged newest first
///
/// Equal timestamps keep places before trips, each in input order.
pub fn timeline(places: Vec<Place>, trips: Vec<FlightSegment>) -> Vec<TimelineItem> {
    let mut items: Vec<TimelineItem> = places
        .into_iter()
        .map(|place| TimelineItem::Place {
            timestamp: place.visit_date,
            place,
        })
        .chain(trips.into_iter().map(|trip| TimelineItem::Trip {
            timestamp: trip.departure_time,
            trip,
        }))
        .collect();

    items.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    const JUN_1_2023: i64 = 1_685_577_600;
    const DAY: i64 = 86_400;

    fn place(id: i64, category: Option<&str>, visit_date: i64) -> Place {
        Place {
            id,
            user_id: 1,
            place_id: format!("place-{id}"),
            name: format!("Place {id}"),
            address: None,
            latitude: 48.8584,
            longitude: 2.2945,
            visit_date,
            category: category.map(str::to_string),
            notes: None,
            marker_color: DEFAULT_MARKER_COLOR.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn trip(id: i64, departure_time: i64) -> FlightSegment {
        FlightSegment {
            id,
            user_id: 1,
            departure_code: "JFK".to_string(),
            arrival_code: "CDG".to_string(),
            departure_time,
            arrival_time: departure_time + 7 * 3600,
            airline: "Air France".to_string(),
            flight_number: "AF23".to_string(),
            reservation: None,
            terminal: None,
            gate: None,
            departure_coordinates: Coordinates::new(40.6413, -73.7781),
            arrival_coordinates: Coordinates::new(49.0097, 2.5479),
            arrival_country: "FR".to_string(),
        }
    }

    #[test]
    fn test_parse_visit_date() {
        assert_eq!(parse_visit_date("2023-06-01"), Ok(JUN_1_2023));
        assert_eq!(parse_visit_date(" 2023-06-01 "), Ok(JUN_1_2023));

        for input in ["", "2023-6-1", "2023-06-01T10:00", "2023-02-30", "+2023-06-01", "June 1"] {
            let err = parse_visit_date(input).unwrap_err();
            assert_eq!(err.input, input);
        }
    }

    #[test]
    fn test_marker_color_default() {
        assert_eq!(marker_color(None), DEFAULT_MARKER_COLOR);
        assert_eq!(marker_color(Some("  ")), DEFAULT_MARKER_COLOR);
        assert_eq!(marker_color(Some("#ff0000")), "#ff0000");
    }

    #[test]
    fn test_filter_by_year_and_category() {
        let places = vec![
            place(1, Some("Museum"), JUN_1_2023),
            place(2, Some("Park"), JUN_1_2023 + DAY),
            place(3, None, JUN_1_2023),
            place(4, Some("Museum"), JUN_1_2023 + 365 * DAY),
        ];

        let ids = |filter: PlaceFilter| -> Vec<i64> {
            filter.apply(places.clone()).iter().map(|p| p.id).collect()
        };

        assert_eq!(ids(PlaceFilter::default()), vec![1, 2, 3, 4]);
        assert_eq!(ids(PlaceFilter::new(Some(2023), None)), vec![1, 2, 3]);
        assert_eq!(ids(PlaceFilter::new(None, Some("Museum"))), vec![1, 4]);
        assert_eq!(ids(PlaceFilter::new(None, Some("Museum, Park"))), vec![1, 2, 4]);
        assert_eq!(ids(PlaceFilter::new(Some(2024), Some("Museum"))), vec![4]);
        assert_eq!(ids(PlaceFilter::new(Some(2023), Some(" , "))), vec![1, 2, 3]);
        assert!(ids(PlaceFilter::new(Some(1999), None)).is_empty());
    }

    #[test]
    fn test_place_stats() {
        let places = vec![
            place(1, Some("Museum"), JUN_1_2023),
            place(2, Some("Museum"), JUN_1_2023),
            place(3, Some("Park"), JUN_1_2023),
            place(4, None, JUN_1_2023),
        ];

        let stats = place_stats(&places);
        assert_eq!(stats.total_places, 4);
        assert_eq!(stats.categories.get("Museum"), Some(&2));
        assert_eq!(stats.categories.get("Park"), Some(&1));
        assert_eq!(stats.categories.len(), 2);

        assert_eq!(place_stats(&[]), PlaceStats::default());
    }

    #[test]
    fn test_timeline_newest_first() {
        let items = timeline(
            vec![place(1, None, JUN_1_2023), place(2, None, JUN_1_2023 + 3 * DAY)],
            vec![trip(10, JUN_1_2023 + DAY), trip(11, JUN_1_2023)],
        );

        let order: Vec<(&str, i64)> = items
            .iter()
            .map(|item| match item {
                TimelineItem::Place { place, .. } => ("place", place.id),
                TimelineItem::Trip { trip, .. } => ("trip", trip.id),
            })
            .collect();
        assert_eq!(
            order,
            vec![("place", 2), ("trip", 10), ("place", 1), ("trip", 11)]
        );
        assert!(items.windows(2).all(|w| w[0].timestamp() >= w[1].timestamp()));
    }

    #[test]
    fn test_timeline_item_serializes_with_type_tag() {
        let items = timeline(vec![place(1, None, JUN_1_2023)], vec![trip(2, JUN_1_2023 - DAY)]);
        let json = serde_json::to_value(&items).unwrap();

        assert_eq!(json[0]["type"], "place");
        assert_eq!(json[0]["timestamp"], JUN_1_2023);
        assert_eq!(json[0]["place"]["id"], 1);
        assert_eq!(json[1]["type"], "trip");
        assert_eq!(json[1]["trip"]["id"], 2);
    }
}
