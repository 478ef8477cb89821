//! Animation time base.
//!
//! Keyframe times are integer milliseconds. Integer ticks keep keyframe
//! lookup exact (no float equality problems when a query lands on a key)
//! and make the wrap-around arithmetic of the extrapolators precise.

/// A point in animation time, in milliseconds.
pub type AnimTime = i64;

/// Converts seconds into animation ticks (truncating toward zero).
#[inline]
#[must_use]
pub fn secs_to_time(secs: f64) -> AnimTime {
    (secs * 1000.0) as AnimTime
}

/// Converts milliseconds into animation ticks.
#[inline]
#[must_use]
pub const fn millis_to_time(millis: i64) -> AnimTime {
    millis
}

/// Converts animation ticks into seconds.
#[inline]
#[must_use]
pub fn time_to_secs(time: AnimTime) -> f64 {
    time as f64 / 1000.0
}

/// Converts animation ticks into milliseconds.
#[inline]
#[must_use]
pub const fn time_to_millis(time: AnimTime) -> i64 {
    time
}
