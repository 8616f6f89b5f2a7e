//! Local wall-clock form input to UTC
//!
//! Each endpoint of a flight is converted with its own airport's zone. The
//! browser-reported zone is only used for codes the table does not know, and
//! an unknown zone id degrades to UTC instead of rejecting the submission.

use chrono::{DateTime, Days, Duration, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::warn;

use super::TimezoneTable;

/// Accepted input layout; seconds are not accepted and always zero
pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid local date-time {input:?}, expected YYYY-MM-DDThh:mm")]
pub struct ParseError {
    pub input: String,
}

#[derive(Debug, Clone, Copy)]
pub struct LocalTimeNormalizer<'a> {
    table: &'a TimezoneTable,
}

impl<'a> LocalTimeNormalizer<'a> {
    pub fn new(table: &'a TimezoneTable) -> Self {
        Self { table }
    }

    /// Interpret `local` as wall-clock time at `location_code` and return the
    /// UTC instant
    pub fn normalize(
        &self,
        local: &str,
        location_code: &str,
        fallback_timezone: &str,
    ) -> Result<DateTime<Utc>, ParseError> {
        let parse_error = || ParseError {
            input: local.to_string(),
        };

        let trimmed = local.trim();
        if !has_local_datetime_shape(trimmed) {
            return Err(parse_error());
        }
        let naive =
            NaiveDateTime::parse_from_str(trimmed, LOCAL_DATETIME_FORMAT).map_err(|_| parse_error())?;

        let zone = self.effective_zone(location_code, fallback_timezone);
        to_utc(naive, zone).ok_or_else(parse_error)
    }

    fn effective_zone(&self, location_code: &str, fallback_timezone: &str) -> Tz {
        let zone_id = self.table.resolve(location_code).unwrap_or(fallback_timezone);

        match zone_id.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                warn!(
                    "Unknown timezone '{}' for location '{}', using UTC",
                    zone_id, location_code
                );
                Tz::UTC
            }
        }
    }
}

/// Ambiguous wall-clock times (clocks going back) take the earlier instant.
/// Times inside a gap (clocks going forward) use the offset in force before
/// the transition.
///
/// `None` only when the instant falls outside chrono's representable range.
fn to_utc(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    if let Some(local) = tz.from_local_datetime(&naive).earliest() {
        return Some(local.with_timezone(&Utc));
    }

    let day_before = naive.checked_sub_days(Days::new(1))?;
    let before = tz
        .offset_from_utc_datetime(&day_before)
        .fix()
        .local_minus_utc();
    naive
        .and_utc()
        .checked_sub_signed(Duration::seconds(i64::from(before)))
}

/// Exactly `YYYY-MM-DDThh:mm`: chrono alone accepts signed years and
/// unpadded fields
fn has_local_datetime_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 16
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b'T',
            13 => *b == b':',
            _ => b.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_airport_zone_takes_precedence() {
        let table = TimezoneTable::new([("JFK", "America/New_York")]);
        let normalizer = LocalTimeNormalizer::new(&table);

        let got = normalizer
            .normalize("2023-01-02T15:04", "JFK", "America/Los_Angeles")
            .unwrap();
        assert_eq!(got, utc(2023, 1, 2, 20, 4));
    }

    #[test]
    fn test_falls_back_to_caller_zone() {
        let table = TimezoneTable::new([("JFK", "America/New_York")]);
        let normalizer = LocalTimeNormalizer::new(&table);

        let got = normalizer
            .normalize("2023-01-02T15:04", "ZZZ", "America/Los_Angeles")
            .unwrap();
        assert_eq!(got, utc(2023, 1, 2, 23, 4));
    }

    #[test]
    fn test_unknown_zone_degrades_to_utc() {
        let table = TimezoneTable::new([("XXX", "Mars/Olympus_Mons")]);
        let normalizer = LocalTimeNormalizer::new(&table);

        let got = normalizer
            .normalize("2023-01-02T15:04", "XXX", "America/Los_Angeles")
            .unwrap();
        assert_eq!(got, utc(2023, 1, 2, 15, 4));

        let got = normalizer
            .normalize("2023-01-02T15:04", "ZZZ", "")
            .unwrap();
        assert_eq!(got, utc(2023, 1, 2, 15, 4));
    }

    #[test]
    fn test_lowercase_code_resolves() {
        let table = TimezoneTable::new([("LHR", "Europe/London")]);
        let normalizer = LocalTimeNormalizer::new(&table);

        let got = normalizer
            .normalize("2023-07-01T09:00", "lhr", "UTC")
            .unwrap();
        assert_eq!(got, utc(2023, 7, 1, 8, 0));
    }

    #[test]
    fn test_malformed_input_is_parse_error() {
        let table = TimezoneTable::default();
        let normalizer = LocalTimeNormalizer::new(&table);

        for input in [
            "",
            "2023-01-02",
            "2023-01-02 15:04",
            "2023-01-02T15:04:05",
            "2023-13-02T15:04",
            "2023-1-2T3:4",
            "2023-01-02T3:04",
            "+2023-01-02T15:04",
            "12023-01-02T15:04",
            "yesterday",
        ] {
            let err = normalizer.normalize(input, "JFK", "UTC").unwrap_err();
            assert_eq!(err.input, input);
        }
    }

    #[test]
    fn test_ambiguous_time_takes_earlier_instant() {
        let table = TimezoneTable::new([("JFK", "America/New_York")]);
        let normalizer = LocalTimeNormalizer::new(&table);

        // 01:30 happens twice on 2023-11-05; the first one is still EDT
        let got = normalizer
            .normalize("2023-11-05T01:30", "JFK", "UTC")
            .unwrap();
        assert_eq!(got, utc(2023, 11, 5, 5, 30));
    }

    #[test]
    fn test_gap_time_uses_offset_before_transition() {
        let table = TimezoneTable::new([("JFK", "America/New_York")]);
        let normalizer = LocalTimeNormalizer::new(&table);

        // 02:30 does not exist on 2023-03-12
        let got = normalizer
            .normalize("2023-03-12T02:30", "JFK", "UTC")
            .unwrap();
        assert_eq!(got, utc(2023, 3, 12, 7, 30));
    }

    #[test]
    fn test_out_of_range_years_are_parse_errors() {
        let table = TimezoneTable::new([("NRT", "Asia/Tokyo"), ("JFK", "America/New_York")]);
        let normalizer = LocalTimeNormalizer::new(&table);

        for (input, code) in [("-262143-01-01T00:00", "NRT"), ("+262142-12-31T23:59", "JFK")] {
            let err = normalizer.normalize(input, code, "UTC").unwrap_err();
            assert_eq!(err.input, input);
        }
    }

    #[test]
    fn test_conversion_at_chrono_limits_does_not_overflow() {
        assert_eq!(to_utc(NaiveDateTime::MIN, Tz::Asia__Tokyo), None);
        assert_eq!(to_utc(NaiveDateTime::MAX, Tz::America__New_York), None);
        assert!(to_utc(NaiveDateTime::MIN, Tz::UTC).is_some());
    }
}
