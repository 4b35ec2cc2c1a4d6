use std::time::{Duration, SystemTime, UNIX_EPOCH};


/// Convert SystemTime to nanoseconds since UNIX_EPOCH.
///
/// Times before the epoch clamp to zero.
pub fn system_time_to_nanos(time: SystemTime) -> u128 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos()
}

/// Convert fractional seconds since UNIX_EPOCH (the legacy snapshot encoding)
/// to whole nanoseconds.
///
/// Negative, NaN, and infinite inputs clamp to zero.
pub fn seconds_f64_to_nanos(seconds: f64) -> u128 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    Duration::try_from_secs_f64(seconds)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}
