//! Workflow errors

use akredo_core::ReviewStatus;
use thiserror::Error;

/// Errors from the review state machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Illegal transition from {from} to {to}")]
    InvalidTransition {
        from: ReviewStatus,
        to: ReviewStatus,
    },

    #[error("A non-empty note is required to reject")]
    NoteRequired,

    #[error("Stale state: action assumed {assumed}, entity is now {actual}")]
    StaleState {
        assumed: ReviewStatus,
        actual: ReviewStatus,
    },

    #[error("Content is frozen while entity is {0}; wait for the review to finish")]
    ContentFrozen(ReviewStatus),
}
