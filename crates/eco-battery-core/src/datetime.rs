// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Eco Battery.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Absolute time parsing for outage schedule sensors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

/// Reduced ISO dates: a bare year or a year and month
static REDUCED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(?:-(\d{2}))?$").expect("reduced date pattern is valid")
});

/// Date-time layouts without an offset; interpreted in the local time zone
const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-time layouts carrying an explicit offset that RFC 3339 parsing rejects
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];

/// Parse a sensor value into an instant
///
/// Tries ISO 8601 / RFC 3339 (with offset), RFC 2822, offset-less ISO
/// date-times in `tz`, ISO dates including `YYYY` and `YYYY-MM` (UTC
/// midnight of the first day), and finally Unix timestamps in seconds.
/// `None` when nothing matches.
pub fn parse_date_time(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    parse_calendar(raw, tz).or_else(|| parse_unix_seconds(raw))
}

fn parse_calendar(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            // Skipped local times (DST gap) have no instant
            return tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    parse_reduced_date(raw)
}

fn parse_reduced_date(raw: &str) -> Option<DateTime<Utc>> {
    let captures = REDUCED_DATE.captures(raw)?;
    let year = captures.get(1)?.as_str().parse::<i32>().ok()?;
    let month = match captures.get(2) {
        Some(month) => month.as_str().parse::<u32>().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_unix_seconds(raw: &str) -> Option<DateTime<Utc>> {
    let seconds = raw.parse::<f64>().ok().filter(|s| s.is_finite())?;
    let millis = (seconds * 1000.0).round();
    let parsed = DateTime::from_timestamp_millis(millis as i64);
    if parsed.is_none() {
        trace!("Timestamp '{}' is outside the representable range", raw);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_rfc3339_with_offset() {
        assert_eq!(
            parse_date_time("2025-10-19T14:00:00+02:00", Tz::UTC),
            Some(utc(2025, 10, 19, 12, 0))
        );
        assert_eq!(
            parse_date_time("2025-10-19T12:00:00Z", Tz::Europe__Prague),
            Some(utc(2025, 10, 19, 12, 0))
        );
        assert_eq!(
            parse_date_time("2025-10-19 12:00:00+00:00", Tz::UTC),
            Some(utc(2025, 10, 19, 12, 0))
        );
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            parse_date_time("Sun, 19 Oct 2025 12:00:00 +0000", Tz::UTC),
            Some(utc(2025, 10, 19, 12, 0))
        );
    }

    #[test]
    fn test_local_datetime_uses_timezone() {
        // Prague is UTC+2 in October (before the switch on the 26th)
        assert_eq!(
            parse_date_time("2025-10-19 14:30", Tz::Europe__Prague),
            Some(utc(2025, 10, 19, 12, 30))
        );
        assert_eq!(
            parse_date_time("2025-10-19T14:30:00", Tz::UTC),
            Some(utc(2025, 10, 19, 14, 30))
        );
    }

    #[test]
    fn test_dst_gap_has_no_instant() {
        assert_eq!(parse_date_time("2025-03-30 02:30", Tz::Europe__Prague), None);
    }

    #[test]
    fn test_date_only_is_utc_midnight() {
        let parsed = parse_date_time("2025-10-20", Tz::Europe__Prague).unwrap();
        assert_eq!(parsed, utc(2025, 10, 20, 0, 0));
        assert_eq!(parsed.hour(), 0);
    }

    #[test]
    fn test_year_and_month_are_dates() {
        assert_eq!(
            parse_date_time("2025", Tz::Europe__Prague),
            Some(utc(2025, 1, 1, 0, 0))
        );
        assert_eq!(
            parse_date_time("2025-10", Tz::UTC),
            Some(utc(2025, 10, 1, 0, 0))
        );
        assert_eq!(parse_date_time("2025-13", Tz::UTC), None);
    }

    #[test]
    fn test_unix_seconds() {
        assert_eq!(
            parse_date_time("1760875200", Tz::UTC),
            Some(utc(2025, 10, 19, 12, 0))
        );
        assert_eq!(
            parse_date_time("1760875200.5", Tz::UTC).map(|t| t.timestamp_millis()),
            Some(1_760_875_200_500)
        );
    }

    #[test]
    fn test_iso_and_timestamp_agree() {
        assert_eq!(
            parse_date_time("2025-10-19T12:00:00Z", Tz::UTC),
            parse_date_time("1760875200", Tz::UTC)
        );
    }

    #[test]
    fn test_unparsable() {
        assert_eq!(parse_date_time("", Tz::UTC), None);
        assert_eq!(parse_date_time("soon", Tz::UTC), None);
        assert_eq!(parse_date_time("unknown", Tz::UTC), None);
        assert_eq!(parse_date_time("1e300", Tz::UTC), None);
    }
}
