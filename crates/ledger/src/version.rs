//! Immutable version records and the rules for creating them

use crate::entity::Entity;
use crate::error::LedgerError;
use akredo_core::{ActorId, ContentRef, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable revision of an entity's content.
///
/// Edits always create a new record; existing records are never mutated or
/// renumbered. Gaps in `version_no` can only appear when a write aborts
/// before any side effect commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub entity_id: EntityId,

    /// 1-based, strictly increasing per entity
    pub version_no: u32,

    /// Opaque content-addressed reference into the evidence store
    pub content_ref: ContentRef,

    /// Blob size in bytes
    pub size: u64,

    /// Content kind (mime type or equivalent)
    pub content_kind: String,

    pub created_by: ActorId,
    pub created_at: DateTime<Utc>,

    /// What changed relative to the previous version; required for
    /// `version_no > 1`
    pub change_note: Option<String>,
}

/// Caller-supplied metadata for a new revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    pub size: u64,
    pub content_kind: String,
    pub change_note: Option<String>,
}

impl VersionRecord {
    /// Build the next version record for `entity`, enforcing the ledger rules.
    ///
    /// - the returned `version_no` is exactly `current_version + 1`
    /// - `change_note` must be present and non-empty for `version_no > 1`
    /// - `expected_version`, when supplied, is an optimistic-concurrency
    ///   check: a mismatch against the stored pointer fails with
    ///   `VersionConflict` and the caller must re-read and retry
    pub fn next(
        entity: &Entity,
        content_ref: ContentRef,
        metadata: VersionMetadata,
        created_by: ActorId,
        expected_version: Option<u32>,
    ) -> Result<Self, LedgerError> {
        if content_ref.as_str().is_empty() {
            return Err(LedgerError::EmptyContentRef);
        }

        if let Some(expected) = expected_version {
            if expected != entity.current_version {
                return Err(LedgerError::VersionConflict {
                    expected,
                    actual: entity.current_version,
                });
            }
        }

        let version_no = entity.current_version + 1;

        let change_note = match metadata.change_note {
            Some(note) if !note.trim().is_empty() => Some(note),
            _ if version_no > 1 => {
                return Err(LedgerError::ChangeNoteRequired { version_no });
            }
            _ => None,
        };

        Ok(Self {
            entity_id: entity.id.clone(),
            version_no,
            content_ref,
            size: metadata.size,
            content_kind: metadata.content_kind,
            created_by,
            created_at: Utc::now(),
            change_note,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akredo_core::EntityKind;

    fn test_entity() -> Entity {
        Entity::new(EntityKind::Document, ActorId::from("unit-07"))
    }

    fn metadata(note: Option<&str>) -> VersionMetadata {
        VersionMetadata {
            size: 2048,
            content_kind: "application/pdf".to_string(),
            change_note: note.map(str::to_string),
        }
    }

    #[test]
    fn test_first_version_needs_no_note() {
        let entity = test_entity();
        let record = VersionRecord::next(
            &entity,
            ContentRef::from("ref-1"),
            metadata(None),
            ActorId::from("unit-07"),
            None,
        )
        .unwrap();

        assert_eq!(record.version_no, 1);
        assert_eq!(record.change_note, None);
    }

    #[test]
    fn test_later_versions_require_note() {
        let mut entity = test_entity();
        entity.advance_to(1);

        let result = VersionRecord::next(
            &entity,
            ContentRef::from("ref-2"),
            metadata(None),
            ActorId::from("unit-07"),
            None,
        );
        assert_eq!(
            result,
            Err(LedgerError::ChangeNoteRequired { version_no: 2 })
        );

        // Whitespace-only notes are not notes
        let result = VersionRecord::next(
            &entity,
            ContentRef::from("ref-2"),
            metadata(Some("   ")),
            ActorId::from("unit-07"),
            None,
        );
        assert!(matches!(
            result,
            Err(LedgerError::ChangeNoteRequired { .. })
        ));

        let record = VersionRecord::next(
            &entity,
            ContentRef::from("ref-2"),
            metadata(Some("rescanned document")),
            ActorId::from("unit-07"),
            None,
        )
        .unwrap();
        assert_eq!(record.version_no, 2);
        assert_eq!(record.change_note.as_deref(), Some("rescanned document"));
    }

    #[test]
    fn test_stale_expected_version_conflicts() {
        let mut entity = test_entity();
        entity.advance_to(1);
        entity.advance_to(2);

        let result = VersionRecord::next(
            &entity,
            ContentRef::from("ref-3"),
            metadata(Some("update")),
            ActorId::from("unit-07"),
            Some(1),
        );
        assert_eq!(
            result,
            Err(LedgerError::VersionConflict {
                expected: 1,
                actual: 2
            })
        );

        // Matching expectation passes
        let record = VersionRecord::next(
            &entity,
            ContentRef::from("ref-3"),
            metadata(Some("update")),
            ActorId::from("unit-07"),
            Some(2),
        )
        .unwrap();
        assert_eq!(record.version_no, 3);
    }

    #[test]
    fn test_empty_content_ref_rejected() {
        let entity = test_entity();
        let result = VersionRecord::next(
            &entity,
            ContentRef::from(""),
            metadata(None),
            ActorId::from("unit-07"),
            None,
        );
        assert_eq!(result, Err(LedgerError::EmptyContentRef));
    }
}
