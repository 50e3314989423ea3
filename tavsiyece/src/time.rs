//! Human-readable timestamps for display records.

use chrono::{DateTime, Utc};

const NOW_LABEL: &str = "şimdi";

/// Parses a stored `createdAt` value.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.with_timezone(&Utc))
}

/// Relative age of `timestamp` as seen at `now`.
///
/// Anything older than a week is shown as a `dd.mm.yyyy` date. A missing
/// timestamp (a server stamp not yet materialized) reads as "şimdi".
pub fn format_relative(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return NOW_LABEL.to_string();
    };
    let seconds = (now - timestamp).num_seconds();
    match seconds {
        s if s < 60 => NOW_LABEL.to_string(),
        s if s < 3_600 => format!("{} dk önce", s / 60),
        s if s < 86_400 => format!("{} saat önce", s / 3_600),
        s if s < 7 * 86_400 => format!("{} gün önce", s / 86_400),
        _ => timestamp.format("%d.%m.%Y").to_string(),
    }
}

/// Clock time (`HH:MM`) used next to comments.
pub fn format_clock(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(timestamp) => timestamp.format("%H:%M").to_string(),
        None => NOW_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn relative_buckets() {
        let now = now();
        assert_eq!(format_relative(Some(now - Duration::seconds(30)), now), "şimdi");
        assert_eq!(format_relative(Some(now - Duration::minutes(5)), now), "5 dk önce");
        assert_eq!(format_relative(Some(now - Duration::hours(3)), now), "3 saat önce");
        assert_eq!(format_relative(Some(now - Duration::days(2)), now), "2 gün önce");
        assert_eq!(format_relative(Some(now - Duration::days(10)), now), "10.05.2024");
        assert_eq!(format_relative(None, now), "şimdi");
    }

    #[test]
    fn future_timestamps_read_as_now() {
        let now = now();
        assert_eq!(format_relative(Some(now + Duration::minutes(2)), now), "şimdi");
    }

    #[test]
    fn clock_and_parse() {
        let ts = parse_timestamp("2024-05-20T09:07:00.000000Z");
        assert_eq!(format_clock(ts), "09:07");
        assert_eq!(format_clock(None), "şimdi");
        assert!(parse_timestamp("yesterday").is_none());
    }
}
