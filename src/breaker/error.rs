//! Breaker error surface.
//!
//! Two families: rejection errors synthesized by the breaker when it
//! declines to attempt a call (the dependency is never contacted), and
//! pass-through errors from the request itself, recorded for accounting
//! but never interpreted.

use super::CircuitState;

/// Error returned by [`CircuitBreaker::through`].
///
/// [`CircuitBreaker::through`]: super::CircuitBreaker::through
#[derive(Debug, thiserror::Error)]
pub enum BreakerError<E> {
    /// Rejected without calling out: the cooldown has not yet elapsed.
    #[error("circuit breaker is open")]
    Open,

    /// Rejected without calling out: the half-open probe episode itself
    /// exceeded the failure threshold.
    #[error("too many requests")]
    TooManyRequests,

    /// The transition table declined a transition the decision logic
    /// expected it to accept.
    ///
    /// Unreachable through the public API; returned instead of an implicit
    /// empty result if the table and the decision logic ever disagree.
    #[error("circuit breaker is in unknown state {0}")]
    Internal(CircuitState),

    /// The request itself failed. Recorded and passed through unchanged.
    #[error("{0}")]
    Service(E),
}

impl<E> BreakerError<E> {
    /// True for errors synthesized by the breaker; the dependency was
    /// never called.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Service(_))
    }

    /// The request's own error, if the call was actually attempted.
    pub fn into_service(self) -> Option<E> {
        match self {
            Self::Service(inner) => Some(inner),
            _ => None,
        }
    }
}
