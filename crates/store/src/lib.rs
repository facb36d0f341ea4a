//! Akredo Store - Persistence layer
//!
//! One SQLite database holds the four append/insert-mostly tables (entities,
//! versions, transitions, audit) plus criteria tags and the mutable
//! notifications inbox. Keeping them in one database is what makes the
//! facade's composite operations atomic: every mutating operation runs in a
//! single `rusqlite` transaction, so a transition can never become visible
//! without its audit entry.
//!
//! Evidence blobs themselves live outside the database behind the
//! content-addressed `EvidenceStore` trait.

pub mod error;
pub mod evidence;
pub mod repo;
pub mod schema;

pub use error::StoreError;
pub use evidence::{DirEvidenceStore, EvidenceStore, MemoryEvidenceStore};

use rusqlite::{Connection, Transaction};
use std::path::Path;

/// Handle to the workflow database.
///
/// Mutating callers take a [`Transaction`] via [`WorkflowStore::begin`] and
/// run the `repo` functions against it; read-only callers may use
/// [`WorkflowStore::conn`] directly.
pub struct WorkflowStore {
    conn: Connection,
}

impl WorkflowStore {
    /// Open (or create) the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let store = Self { conn };
        schema::init_schema(&store.conn)?;
        tracing::debug!(path = %path.display(), "workflow database opened");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        schema::init_schema(&store.conn)?;
        Ok(store)
    }

    /// Begin a transaction covering one composite operation.
    pub fn begin(&mut self) -> Result<Transaction<'_>, StoreError> {
        Ok(self.conn.transaction()?)
    }

    /// Read-only access to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_initializes_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow.db");

        // Open twice: schema init must be idempotent
        drop(WorkflowStore::open(&path).unwrap());
        let store = WorkflowStore::open(&path).unwrap();

        let tables: Vec<String> = store
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        for expected in [
            "audit_log",
            "criteria_tags",
            "entities",
            "notifications",
            "transitions",
            "versions",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_rolled_back_transaction_leaves_nothing() {
        let mut store = WorkflowStore::in_memory().unwrap();

        {
            let tx = store.begin().unwrap();
            tx.execute(
                "INSERT INTO audit_log
                 (id, actor, action, target_type, target_id, before_json, after_json, occurred_at)
                 VALUES ('AUD-X', 'a', 'noop', 'entity', 'DOC-X', 'null', 'null', '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();
            // Dropped without commit
        }

        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
