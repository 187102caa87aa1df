//! Circuit breaker around calls to an unreliable downstream dependency.
//!
//! Tracks failures over a rolling observation window and, once the
//! failure ratio and absolute failure floor are both exceeded, stops
//! issuing calls for a cooldown period, then probes recovery before
//! resuming normal traffic.
//!
//! ## States
//!
//! - **Closed**: normal operation, every request allowed
//! - **Open**: too many failures, requests rejected without calling out
//! - **`HalfOpen`**: cooldown elapsed, probe requests test recovery
//!
//! ## Usage
//!
//! ```
//! use cutout::{BreakerError, CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! let breaker = CircuitBreaker::new(CircuitBreakerConfig {
//!     recovery_interval: Duration::from_secs(30),
//!     ..CircuitBreakerConfig::new(3)
//! });
//!
//! match breaker.through(|| Ok::<_, std::io::Error>("pong")) {
//!     Ok(reply) => assert_eq!(reply, "pong"),
//!     Err(BreakerError::Open) => { /* shed load, dependency is down */ }
//!     Err(err) => panic!("unexpected: {err}"),
//! }
//! ```

mod config;
mod error;
mod state;


pub use config::CircuitBreakerConfig;
pub use error::BreakerError;
pub use state::{CircuitEvent, CircuitState};

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::fsm::Fsm;
use state::CircuitTable;

/// Mutable core: machine state, counters, and timers.
///
/// Lives behind one mutex so the read-evaluate-transition sequence is
/// atomic under concurrent callers; two callers can never race past the
/// threshold check and double-fire a transition, or lose counts.
#[derive(Debug)]
struct Core {
    fsm: Fsm<CircuitTable>,
    /// Failed requests in the current window or probe episode.
    failures: u32,
    /// All recorded requests in the current window or probe episode.
    total: u32,
    /// Successful probes in the current half-open episode.
    probe_successes: u32,
    /// End of the current observation window; `Some` only while closed.
    window_ends: Option<Instant>,
    /// Earliest instant a recovery probe may run; `Some` only while open.
    retry_at: Option<Instant>,
}

impl Core {
    /// Entry action for `Closed`: zero the counters and arm a fresh
    /// observation window.
    fn reset_closed(&mut self, failure_interval: Duration) {
        self.failures = 0;
        self.total = 0;
        self.probe_successes = 0;
        self.window_ends = Some(Instant::now() + failure_interval);
        self.retry_at = None;
    }

    /// Entry action for `Open`: zero the counters and arm the cooldown.
    fn reset_open(&mut self, recovery_interval: Duration) {
        self.failures = 0;
        self.total = 0;
        self.probe_successes = 0;
        self.window_ends = None;
        self.retry_at = Some(Instant::now() + recovery_interval);
    }

    /// Entry action for `HalfOpen`: zero the counters, no timers.
    fn reset_half_open(&mut self) {
        self.failures = 0;
        self.total = 0;
        self.probe_successes = 0;
        self.window_ends = None;
        self.retry_at = None;
    }

    /// `failures / total >= ratio`, false on an empty window.
    fn over_failure_ratio(&self, ratio: f64) -> bool {
        if self.total == 0 {
            return false;
        }
        f64::from(self.failures) / f64::from(self.total) >= ratio
    }

    /// Both trip conditions: ratio met and absolute floor met.
    fn over_threshold(&self, config: &CircuitBreakerConfig) -> bool {
        self.over_failure_ratio(config.failure_ratio) && self.failures >= config.maximum_failure
    }
}

/// Circuit breaker guarding one logical downstream dependency.
///
/// Thread-safe; share across callers with [`std::sync::Arc`]. Admission
/// and accounting are serialized through one mutex, but the lock is never
/// held while the wrapped request runs.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    core: Mutex<Core>,
}

impl CircuitBreaker {
    /// Create a breaker in the closed state with the first observation
    /// window armed.
    ///
    /// Zero or out-of-range configuration fields fall back to the
    /// defaults in [`crate::constants`].
    pub fn new(config: CircuitBreakerConfig) -> Self {
        let config = config.normalized();
        let mut core = Core {
            fsm: Fsm::new(CircuitState::Closed, CircuitTable),
            failures: 0,
            total: 0,
            probe_successes: 0,
            window_ends: None,
            retry_at: None,
        };
        core.reset_closed(config.failure_interval);

        Self {
            config,
            core: Mutex::new(core),
        }
    }

    /// Route one request through the breaker.
    ///
    /// While closed or half-open the request runs and its outcome is
    /// recorded; while open it is rejected with [`BreakerError::Open`]
    /// until the cooldown elapses. When the call is attempted, its own
    /// result is always returned, whether or not it tripped the breaker.
    ///
    /// The breaker never times out or cancels the request; a blocking
    /// request blocks its caller, not other callers. Cancellation, if
    /// desired, belongs inside the request itself.
    pub fn through<T, E, F>(&self, request: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.admit()?;
        let outcome = request();
        self.record(outcome.is_err());
        outcome.map_err(BreakerError::Service)
    }

    /// Current state; no side effects.
    pub fn state(&self) -> CircuitState {
        self.core.lock().fsm.state()
    }

    /// True while the breaker is open, whether or not the cooldown has
    /// elapsed.
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    /// Failures recorded in the current window or probe episode.
    pub fn failure_count(&self) -> u32 {
        self.core.lock().failures
    }

    /// Requests recorded in the current window or probe episode.
    pub fn total_count(&self) -> u32 {
        self.core.lock().total
    }

    /// Decide whether the request may run, transitioning out of `Open`
    /// or re-tripping from `HalfOpen` as a side effect.
    fn admit<E>(&self) -> Result<(), BreakerError<E>> {
        let mut core = self.core.lock();
        match core.fsm.state() {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => match core.retry_at {
                Some(at) if Instant::now() < at => Err(BreakerError::Open),
                _ => {
                    let transition = core.fsm.trigger(CircuitEvent::RecoveryTimeout);
                    if transition.moved_to(CircuitState::HalfOpen) {
                        info!("Circuit breaker transitioning to half-open after cooldown");
                        core.reset_half_open();
                        Ok(())
                    } else {
                        // The table accepts Open + RecoveryTimeout; landing
                        // here means the table and this logic disagree.
                        Err(BreakerError::Internal(transition.state()))
                    }
                }
            },
            CircuitState::HalfOpen => {
                // Evaluated before the probe, on counts carried within this
                // half-open episode.
                if core.over_threshold(&self.config) {
                    let transition = core.fsm.trigger(CircuitEvent::MaximumFailureReached);
                    if transition.moved_to(CircuitState::Open) {
                        warn!(
                            "Circuit breaker re-opening after {} failed probes out of {}",
                            core.failures, core.total
                        );
                        core.reset_open(self.config.recovery_interval);
                    }
                    Err(BreakerError::TooManyRequests)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Record a completed call against the state the breaker is in now.
    fn record(&self, failed: bool) {
        let mut core = self.core.lock();
        match core.fsm.state() {
            CircuitState::Closed => {
                core.total = core.total.saturating_add(1);
                if failed {
                    core.failures = core.failures.saturating_add(1);
                }
                let expired = core.window_ends.is_some_and(|end| Instant::now() >= end);
                if expired {
                    // Rolling window: zero the stats rather than letting
                    // failures accumulate without bound.
                    core.reset_closed(self.config.failure_interval);
                } else if core.over_threshold(&self.config) {
                    let transition = core.fsm.trigger(CircuitEvent::MaximumFailureReached);
                    if transition.moved_to(CircuitState::Open) {
                        warn!(
                            "Circuit breaker opening after {} failures out of {} requests",
                            core.failures, core.total
                        );
                        core.reset_open(self.config.recovery_interval);
                    }
                }
            }
            CircuitState::HalfOpen => {
                core.total = core.total.saturating_add(1);
                if failed {
                    core.failures = core.failures.saturating_add(1);
                } else {
                    core.probe_successes = core.probe_successes.saturating_add(1);
                    if core.probe_successes >= self.config.success_threshold {
                        let transition = core.fsm.trigger(CircuitEvent::MinimumSuccessReached);
                        if transition.moved_to(CircuitState::Closed) {
                            info!(
                                "Circuit breaker closing after {} successful probes",
                                core.probe_successes
                            );
                            core.reset_closed(self.config.failure_interval);
                        }
                    }
                }
            }
            CircuitState::Open => {
                // A call admitted earlier finished after another caller
                // re-opened the circuit; the fresh episode's counters stay
                // untouched.
                debug!("Discarding call outcome (failed: {failed}) recorded after re-open");
            }
        }
    }

    /// Window and cooldown deadlines, for timer-idempotence assertions.
    #[cfg(test)]
    pub(crate) fn timers(&self) -> (Option<Instant>, Option<Instant>) {
        let core = self.core.lock();
        (core.window_ends, core.retry_at)
    }
}
