//! Breaker states, events, and the transition table.
//!
//! States and events are closed enums and the table is an explicit match,
//! so an impossible (state, event) pair is unrepresentable rather than a
//! runtime lookup miss.

use std::fmt;

use crate::fsm::TransitionTable;

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, every request allowed.
    Closed,
    /// Too many failures, requests rejected without calling out.
    Open,
    /// Cooldown elapsed, probe requests test recovery.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        };
        f.write_str(name)
    }
}

/// Events that drive breaker transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitEvent {
    /// Failure ratio and absolute failure floor both exceeded.
    MaximumFailureReached,
    /// Cooldown elapsed; a recovery probe may run.
    RecoveryTimeout,
    /// Enough probe successes to resume normal traffic.
    MinimumSuccessReached,
}

/// The breaker's transition table.
///
/// | From     | Event                 | To       |
/// |----------|-----------------------|----------|
/// | Closed   | MaximumFailureReached | Open     |
/// | Open     | RecoveryTimeout       | HalfOpen |
/// | HalfOpen | MinimumSuccessReached | Closed   |
/// | HalfOpen | MaximumFailureReached | Open     |
///
/// Every other pair holds the current state.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CircuitTable;

impl TransitionTable for CircuitTable {
    type State = CircuitState;
    type Event = CircuitEvent;

    fn next(&self, state: CircuitState, event: CircuitEvent) -> Option<CircuitState> {
        match (state, event) {
            (CircuitState::Closed | CircuitState::HalfOpen, CircuitEvent::MaximumFailureReached) => {
                Some(CircuitState::Open)
            }
            (CircuitState::Open, CircuitEvent::RecoveryTimeout) => Some(CircuitState::HalfOpen),
            (CircuitState::HalfOpen, CircuitEvent::MinimumSuccessReached) => {
                Some(CircuitState::Closed)
            }
            _ => None,
        }
    }
}
