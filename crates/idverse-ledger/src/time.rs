//! Time utilities for the ledger.
//!
//! Ledger timestamps are Unix epoch seconds (u64), matching the resolution a
//! block timestamp carries.

/// Return the current wall-clock time as seconds since Unix epoch.
///
/// A clock set before the epoch reads as 0.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Convert seconds to an RFC 3339 string.
pub fn secs_to_rfc3339(secs: u64) -> String {
    let dt = chrono::DateTime::from_timestamp(secs as i64, 0)
        .unwrap_or(chrono::DateTime::UNIX_EPOCH);
    dt.to_rfc3339()
}
