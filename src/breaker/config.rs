//! Breaker policy configuration.
//!
//! Defines the window, cooldown, and trip thresholds for the breaker.

use std::time::Duration;

use crate::constants;

/// Circuit breaker configuration.
///
/// `maximum_failure` carries no default and is supplied to
/// [`CircuitBreakerConfig::new`]; every other field starts from the
/// defaults in [`crate::constants`] and can be overridden with
/// struct-update syntax:
///
/// ```
/// use cutout::CircuitBreakerConfig;
/// use std::time::Duration;
///
/// let config = CircuitBreakerConfig {
///     recovery_interval: Duration::from_secs(10),
///     ..CircuitBreakerConfig::new(5)
/// };
/// assert_eq!(config.maximum_failure, 5);
/// ```
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Observation window length while closed.
    ///
    /// Once the window ends, counters reset and a fresh window starts,
    /// whether or not the breaker tripped.
    pub failure_interval: Duration,
    /// Cooldown length while open. Calls are rejected outright until it
    /// elapses.
    pub recovery_interval: Duration,
    /// Absolute failure count required to trip, in addition to the ratio.
    ///
    /// Keeps a tiny sample (one failure out of one request) from tripping
    /// the breaker on ratio alone.
    pub maximum_failure: u32,
    /// Fraction of failed requests within the window that arms tripping.
    /// Valid range is (0, 1].
    pub failure_ratio: f64,
    /// Probe successes required in half-open before normal traffic
    /// resumes.
    pub success_threshold: u32,
}

impl CircuitBreakerConfig {
    /// Configuration with the given failure floor and default policy
    /// values for everything else.
    pub fn new(maximum_failure: u32) -> Self {
        Self {
            failure_interval: Duration::from_secs(constants::DEFAULT_FAILURE_INTERVAL_SECS),
            recovery_interval: Duration::from_secs(constants::DEFAULT_RECOVERY_INTERVAL_SECS),
            maximum_failure,
            failure_ratio: constants::DEFAULT_FAILURE_RATIO,
            success_threshold: constants::DEFAULT_SUCCESS_THRESHOLD,
        }
    }

    /// Replace zero or out-of-range fields with defaults.
    ///
    /// `maximum_failure` passes through untouched; it has no default.
    pub(crate) fn normalized(mut self) -> Self {
        if self.failure_interval.is_zero() {
            self.failure_interval = Duration::from_secs(constants::DEFAULT_FAILURE_INTERVAL_SECS);
        }
        if self.recovery_interval.is_zero() {
            self.recovery_interval = Duration::from_secs(constants::DEFAULT_RECOVERY_INTERVAL_SECS);
        }
        // Also rejects NaN
        if !(self.failure_ratio > 0.0 && self.failure_ratio <= 1.0) {
            self.failure_ratio = constants::DEFAULT_FAILURE_RATIO;
        }
        if self.success_threshold == 0 {
            self.success_threshold = constants::DEFAULT_SUCCESS_THRESHOLD;
        }
        self
    }
}
