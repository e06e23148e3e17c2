//! Tri-state result of evaluating a single node.

use serde::{Deserialize, Serialize};

use crate::failure::Failure;

/// Which stage of a composed node produced an outcome. Only used when
/// formatting reports; evaluation never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Origin {
    Head,
    Tail,
    Transform,
    #[default]
    Unknown,
}

/// The active variant of an [`Outcome`].
#[derive(Debug, Clone)]
pub enum State<T> {
    Returned(T),
    ExceptionThrown(Failure),
    /// Evaluation was never attempted (short-circuited, or the input
    /// itself was never produced).
    Skipped,
}

/// Immutable result of evaluating one node against one input.
///
/// Outcomes have no equality of their own; callers compare the variant
/// and, for `Returned`, the carried value.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    state: State<T>,
    origin: Origin,
}

impl<T> Outcome<T> {
    pub fn returned(value: T) -> Self {
        Outcome {
            state: State::Returned(value),
            origin: Origin::Unknown,
        }
    }

    pub fn thrown(failure: Failure) -> Self {
        Outcome {
            state: State::ExceptionThrown(failure),
            origin: Origin::Unknown,
        }
    }

    pub fn skipped() -> Self {
        Outcome {
            state: State::Skipped,
            origin: Origin::Unknown,
        }
    }

    pub fn from_result(result: Result<T, Failure>) -> Self {
        match result {
            Ok(value) => Outcome::returned(value),
            Err(failure) => Outcome::thrown(failure),
        }
    }

    /// Returns the same state tagged with `origin`.
    pub fn with_origin(self, origin: Origin) -> Self {
        Outcome {
            state: self.state,
            origin,
        }
    }

    pub fn state(&self) -> &State<T> {
        &self.state
    }

    pub fn into_state(self) -> State<T> {
        self.state
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_returned(&self) -> bool {
        matches!(self.state, State::Returned(_))
    }

    pub fn is_thrown(&self) -> bool {
        matches!(self.state, State::ExceptionThrown(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.state, State::Skipped)
    }

    pub fn returned_value(&self) -> Option<&T> {
        match &self.state {
            State::Returned(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.state {
            State::ExceptionThrown(failure) => Some(failure),
            _ => None,
        }
    }

    /// Maps a returned value, keeping failures, skips and the origin tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        let state = match self.state {
            State::Returned(value) => State::Returned(f(value)),
            State::ExceptionThrown(failure) => State::ExceptionThrown(failure),
            State::Skipped => State::Skipped,
        };
        Outcome {
            state,
            origin: self.origin,
        }
    }
}
