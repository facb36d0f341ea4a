//! Entity head record

use akredo_core::{ActorId, EntityId, EntityKind, ReviewStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mutable head record of a tracked document or evidence file.
///
/// Only `status`, `current_version`, `canonical_version` and `updated_at`
/// ever change after creation; the version/transition history lives in
/// immutable records alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier, assigned at creation, never reused
    pub id: EntityId,

    /// Document vs. evidence file
    pub kind: EntityKind,

    /// Submitting actor (program / unit)
    pub owner: ActorId,

    /// Current lifecycle status, always the status of the latest version
    pub status: ReviewStatus,

    /// Highest version number with a successful write (0 before version 1 commits)
    pub current_version: u32,

    /// Version frozen as canonical evidence at approval time, if any
    pub canonical_version: Option<u32>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// Create a new entity head in `Draft` with no versions yet.
    ///
    /// The caller is expected to persist version 1 in the same atomic unit.
    pub fn new(kind: EntityKind, owner: ActorId) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            kind,
            owner,
            status: ReviewStatus::Draft,
            current_version: 0,
            canonical_version: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance the current_version pointer.
    ///
    /// Returns false (and leaves the pointer untouched) if `version_no` is
    /// not greater than the stored pointer, so out-of-order completions can
    /// never move the pointer backwards.
    pub fn advance_to(&mut self, version_no: u32) -> bool {
        if version_no > self.current_version {
            self.current_version = version_no;
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    /// Record a status change on the head.
    pub fn set_status(&mut self, status: ReviewStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Freeze the given version as canonical evidence (approval side effect).
    pub fn freeze_canonical(&mut self, version_no: u32) {
        self.canonical_version = Some(version_no);
        self.updated_at = Utc::now();
    }

    /// Metadata-only snapshot for audit before/after fields.
    ///
    /// Never includes blob content, only the head pointers.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "status": self.status,
            "current_version": self.current_version,
            "canonical_version": self.canonical_version,
        })
    }
}
