//! Ledger errors

use thiserror::Error;

/// Errors that can occur in versioning operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("change_note is required for version {version_no} (all versions after the first)")]
    ChangeNoteRequired { version_no: u32 },

    #[error("Version conflict: expected current_version {expected}, found {actual}")]
    VersionConflict { expected: u32, actual: u32 },

    #[error("content_ref cannot be empty")]
    EmptyContentRef,
}
