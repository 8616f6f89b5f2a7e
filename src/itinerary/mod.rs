//! Itinerary reconciliation
//!
//! Splits a user's logged segments into standalone flights and connecting
//! pairs: a segment connects to any later segment leaving from its arrival
//! airport strictly after it lands and less than 24 hours later. Every
//! qualifying candidate is reported; no single "best" itinerary is chosen.

pub mod schedule;

pub use schedule::{past, upcoming};

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::models::{ConnectingPair, FlightSegment};

/// Upper bound (exclusive) of a layover, in seconds after arrival
pub const CONNECTION_WINDOW_SECS: i64 = 86_400;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Connections {
    /// Segments that are neither side of any pair, in input order
    pub standalone: Vec<FlightSegment>,
    /// Grouped by `from`, ascending `from` departure time
    pub pairs: Vec<ConnectingPair>,
}

impl Connections {
    /// Ids of every segment taking part in at least one pair
    pub fn connected_ids(&self) -> HashSet<i64> {
        self.pairs
            .iter()
            .flat_map(|pair| [pair.from.id, pair.to.id])
            .collect()
    }
}

/// Partition all of one user's segments into standalone flights and
/// connecting pairs
pub fn detect(segments: &[FlightSegment]) -> Connections {
    detect_inspecting(segments, |_| {})
}

/// `inspect` sees every candidate the scan looks at, in scan order
fn detect_inspecting<F>(segments: &[FlightSegment], mut inspect: F) -> Connections
where
    F: FnMut(&FlightSegment),
{
    // Candidate next legs, keyed by the airport they leave from. Stable sort
    // so equal departure times keep their input order.
    let mut by_departure: HashMap<&str, Vec<&FlightSegment>> = HashMap::new();
    for segment in segments {
        by_departure
            .entry(segment.departure_code.as_str())
            .or_default()
            .push(segment);
    }
    for bucket in by_departure.values_mut() {
        bucket.sort_by_key(|s| s.departure_time);
    }

    let mut froms: Vec<&FlightSegment> = segments.iter().collect();
    froms.sort_by_key(|s| s.departure_time);

    let mut connected: HashSet<i64> = HashSet::new();
    let mut pairs = Vec::new();

    for from in froms {
        let Some(candidates) = by_departure.get(from.arrival_code.as_str()) else {
            continue;
        };

        let window_start = from.arrival_time;
        let window_end = from.arrival_time + CONNECTION_WINDOW_SECS;

        for to in candidates {
            inspect(to);

            if to.id == from.id {
                continue;
            }
            // Sorted bucket: nothing further along can land in the window
            if to.departure_time >= window_end {
                break;
            }
            if to.departure_time > window_start {
                pairs.push(ConnectingPair {
                    from: from.clone(),
                    to: (*to).clone(),
                });
                connected.insert(from.id);
                connected.insert(to.id);
            }
        }
    }

    let standalone = segments
        .iter()
        .filter(|segment| !connected.contains(&segment.id))
        .cloned()
        .collect();

    Connections { standalone, pairs }
}
