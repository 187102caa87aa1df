//! Property-based tests for the breaker decision logic.
//!
//! These tests use proptest to verify invariants that must hold for any
//! sequence of call outcomes, checked against a pure reference model of
//! the closed-state accounting. Timers are pushed out to an hour so no
//! window or cooldown fires mid-sequence; the time-driven paths are
//! covered by the unit and flaky-service tests.
//!
//! Run with:
//! ```bash
//! cargo test --test property_tests
//! ```

use proptest::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use cutout::{BreakerError, CircuitBreaker, CircuitBreakerConfig, CircuitState};

#[derive(Debug, thiserror::Error)]
#[error("service unavailable")]
struct ServiceDown;

/// Intervals long enough that neither timer can fire during a test.
fn frozen_config(maximum_failure: u32, failure_ratio: f64) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_interval: Duration::from_secs(3600),
        recovery_interval: Duration::from_secs(3600),
        failure_ratio,
        ..CircuitBreakerConfig::new(maximum_failure)
    }
}

/// Reference model of the breaker under a frozen clock: closed-state
/// accounting until the trip, then rejection of everything after.
struct Model {
    state: CircuitState,
    failures: u32,
    total: u32,
}

impl Model {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            total: 0,
        }
    }

    /// Apply one call; returns whether the call should be admitted.
    fn call(&mut self, failed: bool, maximum_failure: u32, ratio: f64) -> bool {
        if self.state == CircuitState::Open {
            return false;
        }
        self.total += 1;
        if failed {
            self.failures += 1;
        }
        let over_ratio = f64::from(self.failures) / f64::from(self.total) >= ratio;
        if over_ratio && self.failures >= maximum_failure {
            self.state = CircuitState::Open;
            self.failures = 0;
            self.total = 0;
        }
        true
    }
}

proptest! {
    /// Invariant: for any outcome sequence, the breaker's state and
    /// counters match a sequential reference model exactly.
    #[test]
    fn breaker_tracks_reference_model(
        outcomes in proptest::collection::vec(any::<bool>(), 0..60),
        maximum_failure in 1u32..10,
    ) {
        let ratio = 0.8;
        let cb = CircuitBreaker::new(frozen_config(maximum_failure, ratio));
        let mut model = Model::new();

        for &failed in &outcomes {
            let admitted = model.call(failed, maximum_failure, ratio);
            let result: Result<&str, BreakerError<ServiceDown>> = cb.through(|| {
                if failed { Err(ServiceDown) } else { Ok("pong") }
            });

            if admitted {
                prop_assert!(
                    !matches!(result, Err(BreakerError::Open)),
                    "model admitted but breaker rejected"
                );
            } else {
                prop_assert!(
                    matches!(result, Err(BreakerError::Open)),
                    "model rejected but breaker admitted"
                );
            }

            prop_assert_eq!(cb.state(), model.state);
            prop_assert_eq!(cb.failure_count(), model.failures);
            prop_assert_eq!(cb.total_count(), model.total);
        }
    }

    /// Invariant: once open, the request function is never invoked again
    /// while the cooldown holds.
    #[test]
    fn open_breaker_never_invokes_requests(
        maximum_failure in 1u32..8,
        extra_calls in 1usize..20,
    ) {
        let cb = CircuitBreaker::new(frozen_config(maximum_failure, 0.8));

        // All-failure prefix trips exactly at the floor
        for _ in 0..maximum_failure {
            let _: Result<&str, BreakerError<ServiceDown>> =
                cb.through(|| Err(ServiceDown));
        }
        prop_assert_eq!(cb.state(), CircuitState::Open);

        let invoked = AtomicU32::new(0);
        for _ in 0..extra_calls {
            let result: Result<&str, BreakerError<ServiceDown>> = cb.through(|| {
                invoked.fetch_add(1, Ordering::SeqCst);
                Ok("pong")
            });
            prop_assert!(matches!(result, Err(BreakerError::Open)));
        }
        prop_assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    /// Invariant: a sequence with fewer failures than the floor can never
    /// trip, whatever the ratio works out to.
    #[test]
    fn below_floor_sequences_stay_closed(
        outcomes in proptest::collection::vec(any::<bool>(), 0..40),
        maximum_failure in 5u32..15,
    ) {
        let failures = outcomes.iter().filter(|&&failed| failed).count() as u32;
        prop_assume!(failures < maximum_failure);

        let cb = CircuitBreaker::new(frozen_config(maximum_failure, 0.8));
        for &failed in &outcomes {
            let _: Result<&str, BreakerError<ServiceDown>> = cb.through(|| {
                if failed { Err(ServiceDown) } else { Ok("pong") }
            });
        }

        prop_assert_eq!(cb.state(), CircuitState::Closed);
        prop_assert_eq!(cb.total_count(), outcomes.len() as u32);
    }

    /// Invariant: all-success traffic is invisible to the breaker's state
    /// whatever the policy.
    #[test]
    fn successes_never_move_the_state(
        calls in 0usize..100,
        maximum_failure in 0u32..10,
        ratio in 0.05f64..1.0,
    ) {
        let cb = CircuitBreaker::new(frozen_config(maximum_failure, ratio));
        for _ in 0..calls {
            let result: Result<&str, BreakerError<ServiceDown>> = cb.through(|| Ok("pong"));
            prop_assert!(result.is_ok());
        }
        prop_assert_eq!(cb.state(), CircuitState::Closed);
        prop_assert_eq!(cb.total_count(), calls as u32);
        prop_assert_eq!(cb.failure_count(), 0);
    }
}
