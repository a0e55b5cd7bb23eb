//! Error types for ranking sessions.

use thiserror::Error;

use crate::types::SessionState;

pub type Result<T> = std::result::Result<T, RankError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankError {
    /// Fewer than two items: there is nothing to compare. The session never starts.
    #[error("Need at least 2 items to rank, got {got}")]
    InsufficientItems { got: usize },

    /// Caller protocol violation: no active comparison, an exhausted side,
    /// or input that does not name a side. State is left untouched.
    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    /// A decision arrived while the session was not awaiting one.
    #[error("Cannot accept a decision while the session is {state}")]
    IllegalStateTransition { state: SessionState },
}
