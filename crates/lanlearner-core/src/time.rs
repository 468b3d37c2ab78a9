//! Millisecond timestamps.
//!
//! Scheduling works on plain epoch milliseconds so persisted values compare
//! and round-trip exactly; `chrono` is only used at the edges.

use chrono::{DateTime, TimeZone, Utc};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

pub const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Current wall-clock time.
pub fn now() -> Timestamp {
    Utc::now().timestamp_millis()
}

pub fn to_datetime(ts: Timestamp) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ts).single()
}

pub fn from_datetime(dt: DateTime<Utc>) -> Timestamp {
    dt.timestamp_millis()
}

/// Format with a `strftime` pattern, falling back to the raw number for
/// timestamps chrono cannot represent.
pub fn format(ts: Timestamp, pattern: &str) -> String {
    match to_datetime(ts) {
        Some(dt) => dt.format(pattern).to_string(),
        None => ts.to_string(),
    }
}

/// RFC 3339 rendering used by exports.
pub fn to_rfc3339(ts: Timestamp) -> String {
    match to_datetime(ts) {
        Some(dt) => dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        None => ts.to_string(),
    }
}

/// Parse an RFC 3339 string or a bare millisecond count.
pub fn parse(input: &str) -> Option<Timestamp> {
    let trimmed = input.trim();
    if let Ok(ms) = trimmed.parse::<i64>() {
        return Some(ms);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| from_datetime(dt.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_of_epoch() {
        assert_eq!(to_rfc3339(0), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn parse_accepts_millis_and_rfc3339() {
        assert_eq!(parse("86400000"), Some(MILLIS_PER_DAY));
        assert_eq!(parse("1970-01-02T00:00:00Z"), Some(MILLIS_PER_DAY));
        assert_eq!(parse("yesterday"), None);
    }

    #[test]
    fn format_uses_pattern() {
        assert_eq!(format(MILLIS_PER_DAY, "%Y-%m-%d"), "1970-01-02");
    }
}
