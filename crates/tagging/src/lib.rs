//! Akredo Tagging - Criteria linker
//!
//! Associates an entity version with accreditation criteria and a review
//! cycle (M:N). Tags on submitted or approved work are immutable so the
//! audit trail stays meaningful; only drafts may be untagged.

pub mod error;
pub mod tag;

pub use error::TaggingError;
pub use tag::CriteriaTag;

use akredo_core::{CriteriaId, EntityKind, ReviewStatus};
use std::collections::BTreeSet;

/// Validate a tag set for an entity of the given kind.
///
/// Evidence files must reference at least one criterion; generic documents
/// may be untagged.
pub fn validate_tag_set(
    kind: EntityKind,
    criteria: &BTreeSet<CriteriaId>,
) -> Result<(), TaggingError> {
    if kind == EntityKind::EvidenceFile && criteria.is_empty() {
        return Err(TaggingError::EmptyCriteriaSet);
    }
    Ok(())
}

/// Check that the tag set may still be changed in the entity's current
/// status. Both tagging and untagging are draft-only operations.
pub fn check_tags_mutable(status: ReviewStatus) -> Result<(), TaggingError> {
    if status == ReviewStatus::Draft {
        Ok(())
    } else {
        Err(TaggingError::TagsImmutable(status))
    }
}
