//! Transition records

use akredo_core::{ActorId, EntityId, ReviewStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One accepted, recorded status change.
///
/// Records are append-only and chained: `from_status` always equals the
/// entity's status immediately prior to the transition, so the sequence of
/// records for an entity forms an unbroken from/to chain starting at `draft`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub entity_id: EntityId,
    pub from_status: ReviewStatus,
    pub to_status: ReviewStatus,
    pub actor: ActorId,

    /// Reviewer/owner note; mandatory for rejections, optional elsewhere,
    /// preserved verbatim when present
    pub note: Option<String>,

    pub occurred_at: DateTime<Utc>,
}

impl TransitionRecord {
    pub fn new(
        entity_id: EntityId,
        from_status: ReviewStatus,
        to_status: ReviewStatus,
        actor: ActorId,
        note: Option<String>,
    ) -> Self {
        Self {
            entity_id,
            from_status,
            to_status,
            actor,
            note,
            occurred_at: Utc::now(),
        }
    }
}
