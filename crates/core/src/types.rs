/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Request document schema version written into every new request.
pub const SCHEMA_VERSION: i32 = 1;

/// Convert a UTC timestamp to epoch milliseconds, the unit used by change
/// entries and saveOffer dates on the wire.
pub fn to_ms(ts: Timestamp) -> i64 {
    ts.timestamp_millis()
}

/// Convert epoch milliseconds back to a UTC timestamp. Out-of-range values
/// (beyond roughly year 262000) collapse to the epoch rather than panicking.
pub fn from_ms(ms: i64) -> Timestamp {
    chrono::DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
