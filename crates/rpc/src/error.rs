//! Facade error taxonomy
//!
//! Inner component errors propagate with their kind intact; nothing is
//! downgraded to a generic success. Mutating operations are never retried by
//! the engine itself - on `Conflict` the caller re-reads and decides.

use akredo_core::ReviewStatus;
use akredo_ledger::LedgerError;
use akredo_store::StoreError;
use akredo_tagging::TaggingError;
use akredo_workflow::WorkflowError;
use thiserror::Error;

/// Errors surfaced by the workflow facade
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input; rejected before any side effect
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Attempted transition is not in the legal table
    #[error("Illegal transition from {from} to {to}")]
    InvalidTransition {
        from: ReviewStatus,
        to: ReviewStatus,
    },

    /// Concurrent modification detected; re-fetch state and retry
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The addressed record does not exist; a terminal caller error, not a
    /// storage outage
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// Persistence layer unreachable or failing; nothing was committed
    #[error("Storage unavailable: {0}")]
    Storage(#[source] StoreError),

    /// Audit write failed - the mutation was rolled back with it, because an
    /// unaudited mutation must never become visible
    #[error("Internal consistency violation: {0}")]
    InternalConsistency(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(kind, id) => EngineError::NotFound(kind, id),
            other => EngineError::Storage(other),
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::VersionConflict { .. } => EngineError::Conflict(err.to_string()),
            LedgerError::ChangeNoteRequired { .. } | LedgerError::EmptyContentRef => {
                EngineError::Validation(err.to_string())
            }
        }
    }
}

impl From<WorkflowError> for EngineError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidTransition { from, to } => {
                EngineError::InvalidTransition { from, to }
            }
            WorkflowError::StaleState { .. } => EngineError::Conflict(err.to_string()),
            WorkflowError::NoteRequired | WorkflowError::ContentFrozen(_) => {
                EngineError::Validation(err.to_string())
            }
        }
    }
}

impl From<TaggingError> for EngineError {
    fn from(err: TaggingError) -> Self {
        EngineError::Validation(err.to_string())
    }
}
