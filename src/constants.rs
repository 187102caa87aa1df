//! Centralized defaults for the breaker policy.
//!
//! All magic numbers in the crate should be defined here with
//! documented rationale. This enables:
//! - Reviewing the policy in one place
//! - Consistent defaults across modules
//! - Easy tuning without code search

// =============================================================================
// Policy Defaults
// =============================================================================

/// Default observation window while closed (20 seconds).
///
/// Failure and request counts accumulate for this long and then reset, so
/// a dependency is judged on recent behavior rather than its whole history.
pub const DEFAULT_FAILURE_INTERVAL_SECS: u64 = 20;

/// Default cooldown while open (40 seconds).
///
/// How long the breaker rejects calls outright before allowing a
/// recovery probe.
pub const DEFAULT_RECOVERY_INTERVAL_SECS: u64 = 40;

/// Default failure ratio that arms tripping (0.8).
///
/// Fraction of failed requests within the window that, together with the
/// absolute failure floor, trips the breaker.
pub const DEFAULT_FAILURE_RATIO: f64 = 0.8;

/// Default probe successes required to close from half-open (1).
///
/// A single successful probe re-admits normal traffic unless the caller
/// configures a longer success streak.
pub const DEFAULT_SUCCESS_THRESHOLD: u32 = 1;
