//! Generic state-transition engine.
//!
//! An [`Fsm`] holds a current state and a transition table. Firing an
//! event looks up the (state, event) pair in the table and adopts the
//! result; a pair with no transition leaves the state untouched, reported
//! as [`Transition::Held`] rather than silently swallowed.
//!
//! The engine is deliberately free of side effects: entry actions (timer
//! resets, counter resets) belong to the owner, which applies them after
//! observing a [`Transition::Moved`]. No domain states or events are
//! referenced here.

use std::fmt;

use parking_lot::Mutex;

/// A closed transition table.
///
/// Implementors express the table as an explicit `match` over
/// (state, event) pairs. Returning `None` means the pair has no
/// transition and the machine holds its current state.
pub trait TransitionTable {
    /// State token.
    type State: Copy + PartialEq + fmt::Debug;
    /// Event token.
    type Event: Copy + fmt::Debug;

    /// Next state for a (state, event) pair, or `None` when the pair has
    /// no transition.
    fn next(&self, state: Self::State, event: Self::Event) -> Option<Self::State>;
}

/// Outcome of firing an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    /// The table had a transition for the pair; the machine moved.
    Moved {
        /// State before the event.
        from: S,
        /// State after the event.
        to: S,
    },
    /// The table had no transition for the pair; the state is unchanged.
    Held(S),
}

impl<S: Copy + PartialEq> Transition<S> {
    /// The state the machine is in after the event, moved or not.
    pub fn state(&self) -> S {
        match *self {
            Self::Moved { to, .. } => to,
            Self::Held(state) => state,
        }
    }

    /// Whether the event moved the machine into `target`.
    pub fn moved_to(&self, target: S) -> bool {
        matches!(*self, Self::Moved { to, .. } if to == target)
    }
}

/// State machine: a current state plus a transition table.
///
/// [`Fsm::trigger`] is safe under concurrent callers; the
/// lookup-and-assign sequence runs under one mutex.
#[derive(Debug)]
pub struct Fsm<T: TransitionTable> {
    state: Mutex<T::State>,
    table: T,
}

impl<T: TransitionTable> Fsm<T> {
    /// Create a machine in `initial` state.
    pub fn new(initial: T::State, table: T) -> Self {
        Self {
            state: Mutex::new(initial),
            table,
        }
    }

    /// Current state; no side effects.
    pub fn state(&self) -> T::State {
        *self.state.lock()
    }

    /// Fire `event` against the current state.
    ///
    /// Looks up the (state, event) pair in the table; on a hit the machine
    /// adopts the table's next state. Returns the resulting state either
    /// way, tagged with whether the machine moved.
    pub fn trigger(&self, event: T::Event) -> Transition<T::State> {
        let mut state = self.state.lock();
        match self.table.next(*state, event) {
            Some(next) => {
                let from = *state;
                *state = next;
                Transition::Moved { from, to: next }
            }
            None => Transition::Held(*state),
        }
    }
}
