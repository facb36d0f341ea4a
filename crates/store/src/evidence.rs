//! Content-addressed evidence store
//!
//! The engine never touches raw file bytes beyond handing them here; it only
//! keeps the opaque `ContentRef` returned by `put`. Refs are
//! `sha256-<hex>`, so storing the same bytes twice is naturally idempotent
//! and a blob written by an aborted composite operation is merely
//! unreferenced, never inconsistent.

use crate::error::StoreError;
use akredo_core::ContentRef;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Compute the content-addressed ref for a blob.
pub fn content_ref_for(bytes: &[u8]) -> ContentRef {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    ContentRef::from(format!("sha256-{}", hex::encode(hasher.finalize())))
}

/// Immutable blob storage behind an opaque reference.
pub trait EvidenceStore {
    /// Persist a blob, returning its content-addressed reference.
    fn put(&self, bytes: &[u8]) -> Result<ContentRef, StoreError>;

    /// Fetch a blob by reference.
    fn get(&self, content_ref: &ContentRef) -> Result<Vec<u8>, StoreError>;

    fn contains(&self, content_ref: &ContentRef) -> bool;
}

/// Directory-backed store: one file per blob, named by its ref.
pub struct DirEvidenceStore {
    base_path: PathBuf,
}

impl DirEvidenceStore {
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn blob_path(&self, content_ref: &ContentRef) -> PathBuf {
        self.base_path.join(content_ref.as_str())
    }
}

impl EvidenceStore for DirEvidenceStore {
    fn put(&self, bytes: &[u8]) -> Result<ContentRef, StoreError> {
        let content_ref = content_ref_for(bytes);
        let path = self.blob_path(&content_ref);
        if !path.exists() {
            fs::write(&path, bytes)?;
        }
        Ok(content_ref)
    }

    fn get(&self, content_ref: &ContentRef) -> Result<Vec<u8>, StoreError> {
        let path = self.blob_path(content_ref);
        if !path.exists() {
            return Err(StoreError::MissingBlob(content_ref.to_string()));
        }
        Ok(fs::read(path)?)
    }

    fn contains(&self, content_ref: &ContentRef) -> bool {
        self.blob_path(content_ref).exists()
    }
}

/// In-memory store (for testing).
#[derive(Default)]
pub struct MemoryEvidenceStore {
    blobs: Mutex<HashMap<ContentRef, Vec<u8>>>,
}

impl MemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EvidenceStore for MemoryEvidenceStore {
    fn put(&self, bytes: &[u8]) -> Result<ContentRef, StoreError> {
        let content_ref = content_ref_for(bytes);
        self.blobs
            .lock()
            .expect("evidence store lock poisoned")
            .insert(content_ref.clone(), bytes.to_vec());
        Ok(content_ref)
    }

    fn get(&self, content_ref: &ContentRef) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .lock()
            .expect("evidence store lock poisoned")
            .get(content_ref)
            .cloned()
            .ok_or_else(|| StoreError::MissingBlob(content_ref.to_string()))
    }

    fn contains(&self, content_ref: &ContentRef) -> bool {
        self.blobs
            .lock()
            .expect("evidence store lock poisoned")
            .contains_key(content_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refs_are_stable_and_content_addressed() {
        let a = content_ref_for(b"scanned document");
        let b = content_ref_for(b"scanned document");
        let c = content_ref_for(b"different document");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_str().starts_with("sha256-"));
        // sha256 hex is 64 chars
        assert_eq!(a.as_str().len(), "sha256-".len() + 64);
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryEvidenceStore::new();

        let content_ref = store.put(b"evidence bytes").unwrap();
        assert!(store.contains(&content_ref));
        assert_eq!(store.get(&content_ref).unwrap(), b"evidence bytes");

        let missing = store.get(&ContentRef::from("sha256-missing"));
        assert!(matches!(missing, Err(StoreError::MissingBlob(_))));
    }

    #[test]
    fn test_dir_store_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirEvidenceStore::new(dir.path().join("blobs")).unwrap();

        let first = store.put(b"evidence bytes").unwrap();
        let second = store.put(b"evidence bytes").unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get(&first).unwrap(), b"evidence bytes");
    }
}
