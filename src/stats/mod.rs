//! Travel statistics over one user's segments
//!
//! Time buckets are always complete (12 months, or the trailing years through
//! the current one) so callers can chart them without filling gaps. Years and
//! months are taken from the UTC departure instant.

pub mod distance;

pub use distance::{haversine_km, mileage, EARTH_RADIUS_KM};

use chrono::{DateTime, Datelike, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::models::{AirlineCount, Aggregation, CountryCount, FlightBucket, FlightSegment};

pub const DEFAULT_TRAILING_YEARS: u32 = 10;

/// Larger windows are clamped to this many years
pub const MAX_TRAILING_YEARS: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid aggregation {value:?}, expected \"m\" or \"y\"")]
pub struct InvalidAggregationError {
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Twelve months of one calendar year
    Month,
    /// Trailing years up to and including the current one
    Year,
}

impl FromStr for Granularity {
    type Err = InvalidAggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" | "month" => Ok(Self::Month),
            "y" | "year" => Ok(Self::Year),
            other => Err(InvalidAggregationError {
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatisticsAggregator {
    trailing_years: u32,
}

impl Default for StatisticsAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TRAILING_YEARS)
    }
}

impl StatisticsAggregator {
    pub fn new(trailing_years: u32) -> Self {
        Self {
            trailing_years: trailing_years.min(MAX_TRAILING_YEARS),
        }
    }

    /// Flight buckets, airline counts and country counts for the selected
    /// granularity
    ///
    /// `year` only applies to [`Granularity::Month`]. An unrecognized
    /// granularity fails before anything is computed.
    pub fn aggregate(
        &self,
        segments: &[FlightSegment],
        granularity: &str,
        year: i32,
        now: DateTime<Utc>,
    ) -> Result<Aggregation, InvalidAggregationError> {
        let granularity = granularity.parse::<Granularity>()?;
        Ok(self.aggregate_by(segments, granularity, year, now))
    }

    pub fn aggregate_by(
        &self,
        segments: &[FlightSegment],
        granularity: Granularity,
        year: i32,
        now: DateTime<Utc>,
    ) -> Aggregation {
        // Airline and country views for the year view cover everything logged
        let scoped: Vec<&FlightSegment> = match granularity {
            Granularity::Month => segments
                .iter()
                .filter(|s| departure_utc(s).is_some_and(|at| at.year() == year))
                .collect(),
            Granularity::Year => segments.iter().collect(),
        };

        let flights = match granularity {
            Granularity::Month => flights_per_month(segments, year),
            Granularity::Year => self.flights_per_year(segments, now),
        };

        debug!(
            "Aggregated {} segments ({:?}): {} in scope",
            segments.len(),
            granularity,
            scoped.len()
        );

        Aggregation {
            flights,
            airlines: airline_counts(scoped.iter().copied()),
            countries: country_counts(scoped.iter().copied()),
        }
    }

    /// One bucket per year from `trailing_years` ago through the current year.
    /// Only departures at or after the same instant `trailing_years` ago count.
    pub fn flights_per_year(&self, segments: &[FlightSegment], now: DateTime<Utc>) -> Vec<FlightBucket> {
        let current_year = now.year();
        let first_year = i32::try_from(self.trailing_years.min(MAX_TRAILING_YEARS))
            .ok()
            .and_then(|years| current_year.checked_sub(years))
            .unwrap_or(current_year);
        let cutoff = self
            .trailing_years
            .checked_mul(12)
            .and_then(|months| now.checked_sub_months(Months::new(months)))
            .map(|at| at.timestamp())
            .unwrap_or(i64::MIN);

        let mut counts = vec![0usize; (current_year - first_year + 1) as usize];
        for segment in segments.iter().filter(|s| s.departure_time >= cutoff) {
            let Some(at) = departure_utc(segment) else {
                continue;
            };
            if (first_year..=current_year).contains(&at.year()) {
                counts[(at.year() - first_year) as usize] += 1;
            }
        }

        buckets((first_year..=current_year).map(|y| y.to_string()), counts)
    }
}

/// Twelve buckets, `"01"` through `"12"`, for departures in `year`
pub fn flights_per_month(segments: &[FlightSegment], year: i32) -> Vec<FlightBucket> {
    let mut counts = vec![0usize; 12];
    for at in segments.iter().filter_map(departure_utc) {
        if at.year() == year {
            counts[at.month0() as usize] += 1;
        }
    }

    buckets((1..=12).map(|m| format!("{m:02}")), counts)
}

/// Flights per airline, most flown first
///
/// Equal counts keep first-seen order; callers should not rely on it.
pub fn airline_counts<'a, I>(segments: I) -> Vec<AirlineCount>
where
    I: IntoIterator<Item = &'a FlightSegment>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<AirlineCount> = Vec::new();

    for segment in segments {
        match index.get(segment.airline.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(segment.airline.as_str(), counts.len());
                counts.push(AirlineCount {
                    label: segment.airline.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Distinct destination airports per arrival country, ordered by country
pub fn country_counts<'a, I>(segments: I) -> Vec<CountryCount>
where
    I: IntoIterator<Item = &'a FlightSegment>,
{
    let mut airports: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for segment in segments {
        airports
            .entry(segment.arrival_country.as_str())
            .or_default()
            .insert(segment.arrival_code.as_str());
    }

    airports
        .into_iter()
        .map(|(country, codes)| CountryCount {
            label: country.to_string(),
            count: codes.len(),
        })
        .collect()
}

/// Every country the user has landed in
pub fn visited_countries(segments: &[FlightSegment]) -> BTreeSet<String> {
    segments
        .iter()
        .map(|s| s.arrival_country.clone())
        .collect()
}

fn departure_utc(segment: &FlightSegment) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(segment.departure_time, 0)
}

fn buckets(labels: impl Iterator<Item = String>, counts: Vec<usize>) -> Vec<FlightBucket> {
    let total = counts.iter().sum();
    labels
        .zip(counts)
        .map(|(label, count)| FlightBucket {
            label,
            count,
            total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, 12, 0, 0).unwrap().timestamp()
    }

    fn flight(id: i64, airline: &str, arrival: &str, country: &str, departure: i64) -> FlightSegment {
        FlightSegment {
            id,
            user_id: 1,
            departure_code: "JFK".to_string(),
            arrival_code: arrival.to_string(),
            departure_time: departure,
            arrival_time: departure + 7200,
            airline: airline.to_string(),
            flight_number: format!("F{id}"),
            reservation: None,
            terminal: None,
            gate: None,
            departure_coordinates: Coordinates::new(40.6413, -73.7781),
            arrival_coordinates: Coordinates::new(51.47, -0.4543),
            arrival_country: country.to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_granularity_parse() {
        assert_eq!("m".parse::<Granularity>(), Ok(Granularity::Month));
        assert_eq!("year".parse::<Granularity>(), Ok(Granularity::Year));
        let err = "w".parse::<Granularity>().unwrap_err();
        assert_eq!(err.value, "w");
        assert!("".parse::<Granularity>().is_err());
        assert!("M".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_invalid_granularity_has_no_result() {
        let segments = vec![flight(1, "Delta", "LHR", "GB", ts(2024, 1, 1))];
        let result = StatisticsAggregator::default().aggregate(&segments, "week", 2024, now());
        assert_eq!(
            result,
            Err(InvalidAggregationError {
                value: "week".to_string()
            })
        );
    }

    #[test]
    fn test_month_buckets_always_twelve() {
        let buckets = flights_per_month(&[], 1999);
        assert_eq!(buckets.len(), 12);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            ["01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12"]
        );
        assert!(buckets.iter().all(|b| b.count == 0 && b.total == 0));
    }

    #[test]
    fn test_month_buckets_count_and_total() {
        let segments = vec![
            flight(1, "Delta", "LHR", "GB", ts(2024, 1, 5)),
            flight(2, "Delta", "LHR", "GB", ts(2024, 1, 20)),
            flight(3, "Delta", "CDG", "FR", ts(2024, 12, 31)),
            flight(4, "Delta", "CDG", "FR", ts(2023, 12, 31)),
        ];

        let buckets = flights_per_month(&segments, 2024);
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[11].count, 1);
        assert!(buckets.iter().all(|b| b.total == 3));
    }

    #[test]
    fn test_year_buckets_trailing_window() {
        let segments = vec![
            flight(1, "Delta", "LHR", "GB", ts(2014, 1, 1)),
            flight(2, "Delta", "LHR", "GB", ts(2014, 7, 1)),
            flight(3, "Delta", "LHR", "GB", ts(2020, 3, 3)),
            flight(4, "Delta", "LHR", "GB", ts(2024, 6, 1)),
            flight(5, "Delta", "LHR", "GB", ts(2025, 1, 1)),
            flight(6, "Delta", "LHR", "GB", ts(2001, 1, 1)),
        ];

        let buckets = StatisticsAggregator::default().flights_per_year(&segments, now());
        assert_eq!(buckets.len(), 11);
        assert_eq!(buckets.first().unwrap().label, "2014");
        assert_eq!(buckets.last().unwrap().label, "2024");

        let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1]);
        assert!(buckets.iter().all(|b| b.total == 3));
    }

    #[test]
    fn test_huge_trailing_window_is_clamped() {
        let segments = vec![flight(1, "Delta", "LHR", "GB", ts(1900, 5, 1))];

        let buckets = StatisticsAggregator::new(400_000_000).flights_per_year(&segments, now());
        assert_eq!(buckets.len(), MAX_TRAILING_YEARS as usize + 1);
        assert_eq!(buckets.first().unwrap().label, "1824");
        assert_eq!(buckets.last().unwrap().label, "2024");
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 1);

        let buckets = StatisticsAggregator::new(u32::MAX).flights_per_year(&[], now());
        assert_eq!(buckets.len(), MAX_TRAILING_YEARS as usize + 1);
    }

    #[test]
    fn test_year_buckets_follow_trailing_setting() {
        let buckets = StatisticsAggregator::new(3).flights_per_year(&[], now());
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["2021", "2022", "2023", "2024"]);
    }

    #[test]
    fn test_airline_counts_descending() {
        let segments = vec![
            flight(1, "United", "LHR", "GB", ts(2024, 1, 1)),
            flight(2, "Delta", "LHR", "GB", ts(2024, 1, 2)),
            flight(3, "Delta", "LHR", "GB", ts(2024, 1, 3)),
            flight(4, "JetBlue", "LHR", "GB", ts(2024, 1, 4)),
            flight(5, "Delta", "LHR", "GB", ts(2024, 1, 5)),
        ];

        let counts = airline_counts(&segments);
        assert_eq!(
            counts,
            vec![
                AirlineCount { label: "Delta".to_string(), count: 3 },
                AirlineCount { label: "United".to_string(), count: 1 },
                AirlineCount { label: "JetBlue".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_country_counts_distinct_airports() {
        let segments = vec![
            flight(1, "Delta", "LHR", "GB", ts(2024, 1, 1)),
            flight(2, "Delta", "LHR", "GB", ts(2024, 2, 1)),
            flight(3, "Delta", "MAN", "GB", ts(2024, 3, 1)),
            flight(4, "Delta", "CDG", "FR", ts(2024, 4, 1)),
            flight(5, "Delta", "CDG", "FR", ts(2024, 5, 1)),
        ];

        let counts = country_counts(&segments);
        assert_eq!(
            counts,
            vec![
                CountryCount { label: "FR".to_string(), count: 1 },
                CountryCount { label: "GB".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_month_scope_filters_airlines_and_countries() {
        let segments = vec![
            flight(1, "Delta", "LHR", "GB", ts(2024, 3, 1)),
            flight(2, "Air France", "CDG", "FR", ts(2023, 3, 1)),
        ];
        let aggregator = StatisticsAggregator::default();

        let monthly = aggregator.aggregate(&segments, "m", 2024, now()).unwrap();
        assert_eq!(monthly.flights.len(), 12);
        assert_eq!(monthly.airlines.len(), 1);
        assert_eq!(monthly.airlines[0].label, "Delta");
        assert_eq!(monthly.countries.len(), 1);

        let yearly = aggregator.aggregate(&segments, "y", 2024, now()).unwrap();
        assert_eq!(yearly.flights.len(), 11);
        assert_eq!(yearly.airlines.len(), 2);
        assert_eq!(yearly.countries.len(), 2);
    }

    #[test]
    fn test_visited_countries() {
        let segments = vec![
            flight(1, "Delta", "LHR", "GB", ts(2024, 1, 1)),
            flight(2, "Delta", "CDG", "FR", ts(2024, 1, 2)),
            flight(3, "Delta", "MAN", "GB", ts(2024, 1, 3)),
        ];

        let visited: Vec<String> = visited_countries(&segments).into_iter().collect();
        assert_eq!(visited, vec!["FR".to_string(), "GB".to_string()]);
    }
}
