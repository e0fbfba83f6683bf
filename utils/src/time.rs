//! Time formatting helpers.

use chrono::{DateTime, SecondsFormat};

/// Format unix seconds as an RFC 3339 UTC string, e.g. `2021-03-01T00:00:00Z`.
///
/// Out-of-range values fall back to the raw number.
pub fn unix_to_rfc3339(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| secs.to_string())
}

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_utc() {
        assert_eq!(unix_to_rfc3339(1_614_556_800), "2021-03-01T00:00:00Z");
        assert_eq!(unix_to_rfc3339(0), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn out_of_range_falls_back() {
        assert_eq!(unix_to_rfc3339(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(5), "5s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(7260), "2h 1m");
    }
}
