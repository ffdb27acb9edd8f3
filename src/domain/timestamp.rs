use chrono::{NaiveDateTime, Timelike};

/// Text format used for every persisted timestamp.
/// Lexicographic order matches chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp for storage. Sub-second precision is dropped.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored `YYYY-MM-DD HH:MM:SS` timestamp.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(input.trim(), TIMESTAMP_FORMAT)
}

/// Drop sub-second precision so a value survives a storage round trip unchanged.
pub fn truncate_to_seconds(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}
