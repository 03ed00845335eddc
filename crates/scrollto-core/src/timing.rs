//! Time calculation utilities for scroll animations
//!
//! Provides pure functions for tick accounting, progress and interpolation.
//! Time is counted in fixed ticks rather than read from a clock, so an
//! animation advances by exactly one tick per timer firing.

use std::time::Duration;

/// Fixed animation tick (~60fps)
pub const TICK: Duration = Duration::from_millis(16);

/// Advance elapsed time by one tick, never past the total duration
#[inline]
pub fn advance(elapsed: Duration, tick: Duration, duration: Duration) -> Duration {
    (elapsed + tick).min(duration)
}

/// Calculate animation progress (0.0 to 1.0) from elapsed time and duration
///
/// # Arguments
/// * `elapsed` - Time the animation has been running
/// * `duration` - Total animation duration
///
/// # Returns
/// Progress value clamped to [0.0, 1.0]
#[inline]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Direction multiplier for travelling from `start` toward `to`
///
/// +1 when scrolling down or already at the target, -1 when scrolling up.
/// The tie goes down, matching the sign an offset is applied with.
#[inline]
pub fn direction(start: f64, to: f64) -> f64 {
    if start - to <= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Interpolated position after covering `eased` of `distance` in `direction`
#[inline]
pub fn interpolate(start: f64, direction: f64, distance: f64, eased: f64) -> f64 {
    start + direction * distance * eased
}
