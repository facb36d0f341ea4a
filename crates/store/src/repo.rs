//! Repository functions
//!
//! All functions take `&Connection`, so they run equally against the plain
//! connection (reads) or inside a `Transaction` (the facade's composite
//! operations). No function here commits anything.

use crate::error::StoreError;
use akredo_audit::{AuditEntry, AuditFilter, TargetType};
use akredo_core::{ActorId, ContentRef, CriteriaId, CycleId, EntityId, EntityKind, ReviewStatus};
use akredo_ledger::{Entity, VersionRecord};
use akredo_notify::{Notification, NotificationKind, Priority, Recipient};
use akredo_tagging::CriteriaTag;
use akredo_workflow::TransitionRecord;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;
use std::str::FromStr;

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::Corrupt(format!("invalid timestamp: {value}")))
}

fn parse_status(value: &str) -> Result<ReviewStatus, StoreError> {
    ReviewStatus::parse(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

// ============================================================================
// Entities
// ============================================================================

type EntityRow = (
    String,
    String,
    String,
    String,
    i64,
    Option<i64>,
    String,
    String,
);

fn entity_from_row(row: &Row<'_>) -> rusqlite::Result<EntityRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn finish_entity(row: EntityRow) -> Result<Entity, StoreError> {
    let (id, kind, owner, status, current_version, canonical_version, created_at, updated_at) =
        row;
    Ok(Entity {
        id: EntityId::from(id),
        kind: EntityKind::from_str(&kind)
            .map_err(|_| StoreError::Corrupt(format!("unknown entity kind: {kind}")))?,
        owner: ActorId::from(owner),
        status: parse_status(&status)?,
        current_version: current_version as u32,
        canonical_version: canonical_version.map(|v| v as u32),
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

const ENTITY_COLUMNS: &str =
    "id, kind, owner, status, current_version, canonical_version, created_at, updated_at";

pub fn insert_entity(conn: &Connection, entity: &Entity) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO entities
         (id, kind, owner, status, current_version, canonical_version, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entity.id.as_str(),
            entity.kind.to_string(),
            entity.owner.as_str(),
            entity.status.as_str(),
            entity.current_version as i64,
            entity.canonical_version.map(|v| v as i64),
            entity.created_at.to_rfc3339(),
            entity.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_entity(conn: &Connection, id: &EntityId) -> Result<Entity, StoreError> {
    let parts = conn
        .query_row(
            &format!("SELECT {ENTITY_COLUMNS} FROM entities WHERE id = ?1"),
            params![id.as_str()],
            entity_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                StoreError::NotFound("Entity", id.to_string())
            }
            other => StoreError::Database(other),
        })?;

    finish_entity(parts)
}

/// Persist the mutable head columns of an entity.
///
/// Everything else about an entity is immutable after insert.
pub fn update_entity_head(conn: &Connection, entity: &Entity) -> Result<(), StoreError> {
    let rows = conn.execute(
        "UPDATE entities
         SET status = ?1, current_version = ?2, canonical_version = ?3, updated_at = ?4
         WHERE id = ?5",
        params![
            entity.status.as_str(),
            entity.current_version as i64,
            entity.canonical_version.map(|v| v as i64),
            entity.updated_at.to_rfc3339(),
            entity.id.as_str(),
        ],
    )?;

    if rows == 0 {
        return Err(StoreError::NotFound("Entity", entity.id.to_string()));
    }
    Ok(())
}

pub fn list_entities_by_status(
    conn: &Connection,
    status: ReviewStatus,
) -> Result<Vec<Entity>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTITY_COLUMNS} FROM entities WHERE status = ?1 ORDER BY created_at, id"
    ))?;
    let rows = stmt.query_map(params![status.as_str()], entity_from_row)?;

    rows.map(|r| finish_entity(r?)).collect()
}

// ============================================================================
// Versions
// ============================================================================

type VersionRow = (
    String,
    i64,
    String,
    i64,
    String,
    String,
    String,
    Option<String>,
);

fn version_from_row(row: &Row<'_>) -> rusqlite::Result<VersionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn finish_version(row: VersionRow) -> Result<VersionRecord, StoreError> {
    let (entity_id, version_no, content_ref, size, content_kind, created_by, created_at, note) =
        row;
    Ok(VersionRecord {
        entity_id: EntityId::from(entity_id),
        version_no: version_no as u32,
        content_ref: ContentRef::from(content_ref),
        size: size as u64,
        content_kind,
        created_by: ActorId::from(created_by),
        created_at: parse_datetime(&created_at)?,
        change_note: note,
    })
}

pub fn insert_version(conn: &Connection, record: &VersionRecord) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO versions
         (entity_id, version_no, content_ref, size, content_kind, created_by, created_at, change_note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.entity_id.as_str(),
            record.version_no as i64,
            record.content_ref.as_str(),
            record.size as i64,
            record.content_kind,
            record.created_by.as_str(),
            record.created_at.to_rfc3339(),
            record.change_note,
        ],
    )?;
    Ok(())
}

pub fn list_versions(
    conn: &Connection,
    entity_id: &EntityId,
) -> Result<Vec<VersionRecord>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT entity_id, version_no, content_ref, size, content_kind, created_by,
                created_at, change_note
         FROM versions WHERE entity_id = ?1 ORDER BY version_no",
    )?;
    let rows = stmt.query_map(params![entity_id.as_str()], version_from_row)?;

    rows.map(|r| finish_version(r?)).collect()
}

/// Highest persisted version number for an entity (0 when none).
pub fn max_version(conn: &Connection, entity_id: &EntityId) -> Result<u32, StoreError> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(version_no) FROM versions WHERE entity_id = ?1",
        params![entity_id.as_str()],
        |row| row.get(0),
    )?;
    Ok(max.unwrap_or(0) as u32)
}

// ============================================================================
// Transitions
// ============================================================================

pub fn insert_transition(conn: &Connection, record: &TransitionRecord) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO transitions (entity_id, from_status, to_status, actor, note, occurred_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.entity_id.as_str(),
            record.from_status.as_str(),
            record.to_status.as_str(),
            record.actor.as_str(),
            record.note,
            record.occurred_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_transitions(
    conn: &Connection,
    entity_id: &EntityId,
) -> Result<Vec<TransitionRecord>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT entity_id, from_status, to_status, actor, note, occurred_at
         FROM transitions WHERE entity_id = ?1 ORDER BY seq",
    )?;
    let rows = stmt.query_map(params![entity_id.as_str()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    rows.map(|r| {
        let (entity_id, from, to, actor, note, occurred_at) = r?;
        Ok(TransitionRecord {
            entity_id: EntityId::from(entity_id),
            from_status: parse_status(&from)?,
            to_status: parse_status(&to)?,
            actor: ActorId::from(actor),
            note,
            occurred_at: parse_datetime(&occurred_at)?,
        })
    })
    .collect()
}

pub fn count_transitions(conn: &Connection) -> Result<usize, StoreError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM transitions", [], |row| row.get(0))?;
    Ok(count as usize)
}

// ============================================================================
// Criteria tags
// ============================================================================

/// Insert or refresh tag rows.
///
/// Re-tagging an existing (entity, criterion, cycle) link bumps its
/// version_no in place - the link itself is the stable fact.
pub fn upsert_tags(conn: &Connection, tags: &[CriteriaTag]) -> Result<(), StoreError> {
    for tag in tags {
        conn.execute(
            "INSERT OR REPLACE INTO criteria_tags
             (entity_id, version_no, criteria_id, cycle_id, tagged_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                tag.entity_id.as_str(),
                tag.version_no as i64,
                tag.criteria_id.as_str(),
                tag.cycle_id.as_str(),
                tag.tagged_at.to_rfc3339(),
            ],
        )?;
    }
    Ok(())
}

/// Point all of an entity's tag rows at the given version.
///
/// Called when a new version commits, so tags always describe the entity at
/// its current version; the (criterion, cycle) links themselves are
/// untouched.
pub fn carry_tags_forward(
    conn: &Connection,
    entity_id: &EntityId,
    version_no: u32,
) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "UPDATE criteria_tags SET version_no = ?2 WHERE entity_id = ?1",
        params![entity_id.as_str(), version_no as i64],
    )?)
}

pub fn delete_tags(
    conn: &Connection,
    entity_id: &EntityId,
    cycle_id: &CycleId,
    criteria: &BTreeSet<CriteriaId>,
) -> Result<usize, StoreError> {
    let mut removed = 0;
    for criteria_id in criteria {
        removed += conn.execute(
            "DELETE FROM criteria_tags
             WHERE entity_id = ?1 AND cycle_id = ?2 AND criteria_id = ?3",
            params![entity_id.as_str(), cycle_id.as_str(), criteria_id.as_str()],
        )?;
    }
    Ok(removed)
}

pub fn list_tags(conn: &Connection, entity_id: &EntityId) -> Result<Vec<CriteriaTag>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT entity_id, version_no, criteria_id, cycle_id, tagged_at
         FROM criteria_tags WHERE entity_id = ?1 ORDER BY cycle_id, criteria_id",
    )?;
    let rows = stmt.query_map(params![entity_id.as_str()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    rows.map(|r| {
        let (entity_id, version_no, criteria_id, cycle_id, tagged_at) = r?;
        Ok(CriteriaTag {
            entity_id: EntityId::from(entity_id),
            version_no: version_no as u32,
            criteria_id: CriteriaId::from(criteria_id),
            cycle_id: CycleId::from(cycle_id),
            tagged_at: parse_datetime(&tagged_at)?,
        })
    })
    .collect()
}

/// Entities tagged with (cycle, criterion), at their current version,
/// optionally narrowed by status. Deterministic order: created_at, then id.
pub fn find_by_criteria(
    conn: &Connection,
    cycle_id: &CycleId,
    criteria_id: &CriteriaId,
    status: Option<ReviewStatus>,
) -> Result<Vec<Entity>, StoreError> {
    let base = format!(
        "SELECT {} FROM entities e
         JOIN criteria_tags t ON t.entity_id = e.id
         WHERE t.cycle_id = ?1 AND t.criteria_id = ?2",
        ENTITY_COLUMNS
            .split(", ")
            .map(|c| format!("e.{c}"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let rows: Vec<_> = match status {
        Some(status) => {
            let mut stmt =
                conn.prepare(&format!("{base} AND e.status = ?3 ORDER BY e.created_at, e.id"))?;
            let mapped = stmt.query_map(
                params![cycle_id.as_str(), criteria_id.as_str(), status.as_str()],
                entity_from_row,
            )?;
            mapped.collect::<Result<_, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!("{base} ORDER BY e.created_at, e.id"))?;
            let mapped = stmt.query_map(
                params![cycle_id.as_str(), criteria_id.as_str()],
                entity_from_row,
            )?;
            mapped.collect::<Result<_, _>>()?
        }
    };

    rows.into_iter().map(finish_entity).collect()
}

// ============================================================================
// Notifications
// ============================================================================

fn notification_from_row(
    row: &Row<'_>,
) -> rusqlite::Result<(String, String, String, String, String, bool, Option<String>, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn finish_notification(
    parts: (String, String, String, String, String, bool, Option<String>, String),
) -> Result<Notification, StoreError> {
    let (id, recipient, kind, priority, message, read, related_entity, created_at) = parts;
    Ok(Notification {
        id,
        recipient: Recipient::parse(&recipient)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        kind: NotificationKind::parse(&kind)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown notification kind: {kind}")))?,
        priority: Priority::parse(&priority)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown priority: {priority}")))?,
        message,
        read,
        related_entity: related_entity.map(EntityId::from),
        created_at: parse_datetime(&created_at)?,
    })
}

const NOTIFICATION_COLUMNS: &str =
    "id, recipient, kind, priority, message, read, related_entity, created_at";

pub fn insert_notification(
    conn: &Connection,
    notification: &Notification,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO notifications
         (id, recipient, kind, priority, message, read, related_entity, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            notification.id,
            notification.recipient.as_selector(),
            notification.kind.as_str(),
            notification.priority.as_str(),
            notification.message,
            notification.read,
            notification.related_entity.as_ref().map(|e| e.as_str()),
            notification.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_notification(conn: &Connection, id: &str) -> Result<Notification, StoreError> {
    let parts = conn
        .query_row(
            &format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1"),
            params![id],
            notification_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                StoreError::NotFound("Notification", id.to_string())
            }
            other => StoreError::Database(other),
        })?;
    finish_notification(parts)
}

pub fn list_notifications(
    conn: &Connection,
    recipient: &Recipient,
    unread_only: bool,
) -> Result<Vec<Notification>, StoreError> {
    let filter = if unread_only { " AND read = 0" } else { "" };
    let mut stmt = conn.prepare(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications
         WHERE recipient = ?1{filter} ORDER BY created_at DESC, id"
    ))?;
    let rows = stmt.query_map(params![recipient.as_selector()], notification_from_row)?;

    rows.map(|r| finish_notification(r?)).collect()
}

/// Flip the read flag. The engine never touches notification content.
pub fn mark_notification_read(conn: &Connection, id: &str) -> Result<(), StoreError> {
    let rows = conn.execute(
        "UPDATE notifications SET read = 1 WHERE id = ?1",
        params![id],
    )?;
    if rows == 0 {
        return Err(StoreError::NotFound("Notification", id.to_string()));
    }
    Ok(())
}

pub fn delete_notification(conn: &Connection, id: &str) -> Result<(), StoreError> {
    let rows = conn.execute("DELETE FROM notifications WHERE id = ?1", params![id])?;
    if rows == 0 {
        return Err(StoreError::NotFound("Notification", id.to_string()));
    }
    Ok(())
}

pub fn count_notifications(conn: &Connection) -> Result<usize, StoreError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM notifications", [], |row| row.get(0))?;
    Ok(count as usize)
}

// ============================================================================
// Audit log
// ============================================================================

pub fn insert_audit(conn: &Connection, entry: &AuditEntry) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO audit_log
         (id, actor, action, target_type, target_id, before_json, after_json, occurred_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id,
            entry.actor.as_str(),
            entry.action,
            entry.target_type.as_str(),
            entry.target_id,
            serde_json::to_string(&entry.before)?,
            serde_json::to_string(&entry.after)?,
            entry.occurred_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_audit(conn: &Connection, filter: &AuditFilter) -> Result<Vec<AuditEntry>, StoreError> {
    // The filter's optional clauses are applied in SQL where cheap (target,
    // actor) and re-checked in memory for the date range.
    let mut sql = String::from(
        "SELECT id, actor, action, target_type, target_id, before_json, after_json, occurred_at
         FROM audit_log WHERE 1 = 1",
    );
    let mut binds: Vec<String> = Vec::new();

    if let Some(ref target_id) = filter.target_id {
        binds.push(target_id.clone());
        sql.push_str(&format!(" AND target_id = ?{}", binds.len()));
    }
    if let Some(ref actor) = filter.actor {
        binds.push(actor.as_str().to_string());
        sql.push_str(&format!(" AND actor = ?{}", binds.len()));
    }
    sql.push_str(" ORDER BY occurred_at, id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(binds.iter()), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, actor, action, target_type, target_id, before, after, occurred_at) = row?;
        let entry = AuditEntry {
            id,
            actor: ActorId::from(actor),
            action,
            target_type: TargetType::parse(&target_type).ok_or_else(|| {
                StoreError::Corrupt(format!("unknown target type: {target_type}"))
            })?,
            target_id,
            before: serde_json::from_str(&before)?,
            after: serde_json::from_str(&after)?,
            occurred_at: parse_datetime(&occurred_at)?,
        };
        if filter.matches(&entry) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

pub fn count_audit(conn: &Connection) -> Result<usize, StoreError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))?;
    Ok(count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkflowStore;
    use akredo_ledger::VersionMetadata;
    use serde_json::json;

    fn store() -> WorkflowStore {
        WorkflowStore::in_memory().unwrap()
    }

    fn sample_entity() -> Entity {
        Entity::new(EntityKind::EvidenceFile, ActorId::from("unit-07"))
    }

    fn sample_version(entity: &Entity) -> VersionRecord {
        VersionRecord::next(
            entity,
            ContentRef::from("sha256-abc"),
            VersionMetadata {
                size: 1024,
                content_kind: "application/pdf".to_string(),
                change_note: None,
            },
            ActorId::from("unit-07"),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_entity_round_trip() {
        let store = store();
        let mut entity = sample_entity();
        insert_entity(store.conn(), &entity).unwrap();

        entity.advance_to(1);
        entity.set_status(ReviewStatus::Submitted);
        update_entity_head(store.conn(), &entity).unwrap();

        let loaded = get_entity(store.conn(), &entity.id).unwrap();
        assert_eq!(loaded.status, ReviewStatus::Submitted);
        assert_eq!(loaded.current_version, 1);
        assert_eq!(loaded.kind, EntityKind::EvidenceFile);

        let missing = get_entity(store.conn(), &EntityId::from("DOC-NOPE"));
        assert!(matches!(missing, Err(StoreError::NotFound("Entity", _))));
    }

    #[test]
    fn test_versions_ordered_and_max() {
        let store = store();
        let mut entity = sample_entity();
        insert_entity(store.conn(), &entity).unwrap();

        let v1 = sample_version(&entity);
        insert_version(store.conn(), &v1).unwrap();
        entity.advance_to(1);

        let v2 = VersionRecord::next(
            &entity,
            ContentRef::from("sha256-def"),
            VersionMetadata {
                size: 2048,
                content_kind: "application/pdf".to_string(),
                change_note: Some("rescanned document".to_string()),
            },
            ActorId::from("unit-07"),
            None,
        )
        .unwrap();
        insert_version(store.conn(), &v2).unwrap();

        let versions = list_versions(store.conn(), &entity.id).unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].version_no, 1);
        assert_eq!(versions[1].version_no, 2);
        assert_eq!(max_version(store.conn(), &entity.id).unwrap(), 2);
        assert_eq!(
            max_version(store.conn(), &EntityId::from("DOC-NOPE")).unwrap(),
            0
        );
    }

    #[test]
    fn test_transition_chain_round_trip() {
        let store = store();
        let entity = sample_entity();
        insert_entity(store.conn(), &entity).unwrap();

        for (from, to) in [
            (ReviewStatus::Draft, ReviewStatus::Submitted),
            (ReviewStatus::Submitted, ReviewStatus::InReview),
        ] {
            insert_transition(
                store.conn(),
                &TransitionRecord::new(
                    entity.id.clone(),
                    from,
                    to,
                    ActorId::from("reviewer-01"),
                    None,
                ),
            )
            .unwrap();
        }

        let transitions = list_transitions(store.conn(), &entity.id).unwrap();
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].to_status, transitions[1].from_status);
    }

    #[test]
    fn test_find_by_criteria() {
        let store = store();
        let entity = sample_entity();
        insert_entity(store.conn(), &entity).unwrap();

        let criteria: BTreeSet<_> = [CriteriaId::from("K1"), CriteriaId::from("K3")]
            .into_iter()
            .collect();
        let tags = CriteriaTag::expand(&entity.id, 1, &criteria, &CycleId::from("C1"));
        upsert_tags(store.conn(), &tags).unwrap();

        let found = find_by_criteria(
            store.conn(),
            &CycleId::from("C1"),
            &CriteriaId::from("K1"),
            None,
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, entity.id);

        // Status narrowing
        let none = find_by_criteria(
            store.conn(),
            &CycleId::from("C1"),
            &CriteriaId::from("K1"),
            Some(ReviewStatus::Approved),
        )
        .unwrap();
        assert!(none.is_empty());

        // Unknown criterion
        let none = find_by_criteria(
            store.conn(),
            &CycleId::from("C1"),
            &CriteriaId::from("K9"),
            None,
        )
        .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_tag_delete() {
        let store = store();
        let entity = sample_entity();
        insert_entity(store.conn(), &entity).unwrap();

        let criteria: BTreeSet<_> = [CriteriaId::from("K1"), CriteriaId::from("K3")]
            .into_iter()
            .collect();
        let tags = CriteriaTag::expand(&entity.id, 1, &criteria, &CycleId::from("C1"));
        upsert_tags(store.conn(), &tags).unwrap();

        let removed: BTreeSet<_> = [CriteriaId::from("K1")].into_iter().collect();
        let count = delete_tags(store.conn(), &entity.id, &CycleId::from("C1"), &removed).unwrap();
        assert_eq!(count, 1);

        let rest = list_tags(store.conn(), &entity.id).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].criteria_id, CriteriaId::from("K3"));
    }

    #[test]
    fn test_carry_tags_forward() {
        let store = store();
        let entity = sample_entity();
        insert_entity(store.conn(), &entity).unwrap();

        let criteria: BTreeSet<_> = [CriteriaId::from("K1"), CriteriaId::from("K3")]
            .into_iter()
            .collect();
        let tags = CriteriaTag::expand(&entity.id, 1, &criteria, &CycleId::from("C1"));
        upsert_tags(store.conn(), &tags).unwrap();

        let moved = carry_tags_forward(store.conn(), &entity.id, 2).unwrap();
        assert_eq!(moved, 2);

        let tags = list_tags(store.conn(), &entity.id).unwrap();
        assert!(tags.iter().all(|t| t.version_no == 2));
        // Links themselves are untouched
        let ids: BTreeSet<_> = tags.into_iter().map(|t| t.criteria_id).collect();
        assert_eq!(ids, criteria);
    }

    #[test]
    fn test_notification_inbox_round_trip() {
        let store = store();
        let dispatcher = akredo_notify::NotificationDispatcher::new();
        let recipient = Recipient::User(ActorId::from("unit-07"));

        let notification = dispatcher.emit(
            NotificationKind::StatusChange,
            recipient.clone(),
            Priority::High,
            "Evidence DOC-1 rejected",
            Some(EntityId::from("DOC-1")),
        );
        insert_notification(store.conn(), &notification).unwrap();

        let unread = list_notifications(store.conn(), &recipient, true).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].priority, Priority::High);

        mark_notification_read(store.conn(), &notification.id).unwrap();
        assert!(list_notifications(store.conn(), &recipient, true)
            .unwrap()
            .is_empty());
        let all = list_notifications(store.conn(), &recipient, false).unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].read);

        delete_notification(store.conn(), &notification.id).unwrap();
        assert!(matches!(
            get_notification(store.conn(), &notification.id),
            Err(StoreError::NotFound("Notification", _))
        ));
    }

    #[test]
    fn test_audit_filters() {
        let store = store();

        let entries = [
            AuditEntry::new(
                ActorId::from("unit-07"),
                "entity_created",
                TargetType::Entity,
                "DOC-1",
                json!(null),
                json!({"status": "draft"}),
            ),
            AuditEntry::new(
                ActorId::from("reviewer-01"),
                "status_changed",
                TargetType::Entity,
                "DOC-1",
                json!({"status": "in_review"}),
                json!({"status": "approved"}),
            ),
            AuditEntry::new(
                ActorId::from("reviewer-01"),
                "status_changed",
                TargetType::Entity,
                "DOC-2",
                json!({"status": "in_review"}),
                json!({"status": "rejected"}),
            ),
        ];
        for entry in &entries {
            insert_audit(store.conn(), entry).unwrap();
        }

        let by_target = list_audit(store.conn(), &AuditFilter::for_target("DOC-1")).unwrap();
        assert_eq!(by_target.len(), 2);

        let by_actor =
            list_audit(store.conn(), &AuditFilter::for_actor(ActorId::from("reviewer-01")))
                .unwrap();
        assert_eq!(by_actor.len(), 2);

        let all = list_audit(store.conn(), &AuditFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(count_audit(store.conn()).unwrap(), 3);

        let windowed = AuditFilter {
            from: Some(Utc::now() + chrono::Duration::hours(1)),
            ..AuditFilter::default()
        };
        assert!(list_audit(store.conn(), &windowed).unwrap().is_empty());
    }
}
