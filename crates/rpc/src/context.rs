//! Application context - wires everything together

use crate::engine::WorkflowEngine;
use akredo_store::{DirEvidenceStore, WorkflowStore};
use akredo_workflow::WorkflowConfig;
use std::path::{Path, PathBuf};

/// Application context - owns the engine and the on-disk layout.
///
/// The data directory holds `workflow.db` (entities, versions, transitions,
/// tags, notifications, audit log) and `blobs/` (content-addressed evidence
/// bytes, one file per ref).
pub struct AppContext {
    pub engine: WorkflowEngine,
    db_path: PathBuf,
    blobs_path: PathBuf,
}

impl AppContext {
    /// Create a new application context rooted at `data_path`.
    pub fn new(data_path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let data_path = data_path.as_ref();
        let db_path = data_path.join("workflow.db");
        let blobs_path = data_path.join("blobs");

        std::fs::create_dir_all(data_path)?;

        let store = WorkflowStore::open(&db_path)?;
        let evidence = DirEvidenceStore::new(&blobs_path)?;

        let reviewer_role =
            std::env::var("AKREDO_REVIEWER_ROLE").unwrap_or_else(|_| "quality-reviewers".into());

        let engine = WorkflowEngine::new(
            store,
            Box::new(evidence),
            WorkflowConfig { reviewer_role },
        );

        Ok(Self {
            engine,
            db_path,
            blobs_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn blobs_path(&self) -> &Path {
        &self.blobs_path
    }
}
