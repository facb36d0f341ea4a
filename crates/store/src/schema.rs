//! Database schema
//!
//! Four append/insert-mostly tables (entities are mutable only in their
//! status/version pointer columns; versions, transitions and audit_log are
//! immutable once written) plus criteria_tags and the notifications inbox,
//! whose `read` flag is the only field the inbox may flip.

use crate::error::StoreError;
use rusqlite::Connection;

/// Create all tables and indexes. Idempotent.
pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS entities (
            id                TEXT PRIMARY KEY,
            kind              TEXT NOT NULL,
            owner             TEXT NOT NULL,
            status            TEXT NOT NULL,
            current_version   INTEGER NOT NULL,
            canonical_version INTEGER,
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS versions (
            entity_id    TEXT NOT NULL,
            version_no   INTEGER NOT NULL,
            content_ref  TEXT NOT NULL,
            size         INTEGER NOT NULL,
            content_kind TEXT NOT NULL,
            created_by   TEXT NOT NULL,
            created_at   TEXT NOT NULL,
            change_note  TEXT,
            PRIMARY KEY (entity_id, version_no)
        );

        CREATE TABLE IF NOT EXISTS transitions (
            seq         INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id   TEXT NOT NULL,
            from_status TEXT NOT NULL,
            to_status   TEXT NOT NULL,
            actor       TEXT NOT NULL,
            note        TEXT,
            occurred_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS criteria_tags (
            entity_id   TEXT NOT NULL,
            version_no  INTEGER NOT NULL,
            criteria_id TEXT NOT NULL,
            cycle_id    TEXT NOT NULL,
            tagged_at   TEXT NOT NULL,
            PRIMARY KEY (entity_id, criteria_id, cycle_id)
        );

        CREATE TABLE IF NOT EXISTS notifications (
            id             TEXT PRIMARY KEY,
            recipient      TEXT NOT NULL,
            kind           TEXT NOT NULL,
            priority       TEXT NOT NULL,
            message        TEXT NOT NULL,
            read           INTEGER NOT NULL DEFAULT 0,
            related_entity TEXT,
            created_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS audit_log (
            id          TEXT PRIMARY KEY,
            actor       TEXT NOT NULL,
            action      TEXT NOT NULL,
            target_type TEXT NOT NULL,
            target_id   TEXT NOT NULL,
            before_json TEXT NOT NULL,
            after_json  TEXT NOT NULL,
            occurred_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_versions_entity
            ON versions(entity_id, version_no);
        CREATE INDEX IF NOT EXISTS idx_transitions_entity
            ON transitions(entity_id, seq);
        CREATE INDEX IF NOT EXISTS idx_tags_lookup
            ON criteria_tags(cycle_id, criteria_id);
        CREATE INDEX IF NOT EXISTS idx_notifications_recipient
            ON notifications(recipient, read);
        CREATE INDEX IF NOT EXISTS idx_audit_target
            ON audit_log(target_id);
        CREATE INDEX IF NOT EXISTS idx_audit_actor
            ON audit_log(actor);
        CREATE INDEX IF NOT EXISTS idx_audit_time
            ON audit_log(occurred_at);",
    )?;

    Ok(())
}
