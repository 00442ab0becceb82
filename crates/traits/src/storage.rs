//! ArtifactStore trait for reading and writing versioned byte blobs.
//!
//! Final dossiers and letters are persisted through this trait, and stored
//! attachments (licences, reports) are read back through it. The engine never
//! touches a filesystem or bucket directly.

use async_trait::async_trait;
use dossier_types::CaseId;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for artifact storage operations.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Failed to read '{key}': {message}")]
    ReadFailed { key: String, message: String },

    #[error("Failed to write '{key}': {message}")]
    WriteFailed { key: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// A stored blob together with the version it was stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub version: u32,
    pub bytes: Arc<Vec<u8>>,
}

/// Versioned blob storage keyed by case and document category.
///
/// Versions start at 1 and grow by one with every `put` for the same key.
/// Writes are last-writer-wins; there is no compare-and-swap.
#[async_trait]
pub trait ArtifactStore: Send + Sync + Debug {
    /// Reads a version of a blob, or the latest one when `version` is `None`.
    /// Returns `Ok(None)` when nothing is stored under the key.
    async fn get(
        &self,
        case_id: &CaseId,
        category: &str,
        version: Option<u32>,
    ) -> Result<Option<StoredArtifact>, StorageError>;

    /// Stores a new version and returns its number.
    async fn put(
        &self,
        case_id: &CaseId,
        category: &str,
        bytes: Vec<u8>,
    ) -> Result<u32, StorageError>;

    /// Returns a human-readable name for this store (for logging/debugging).
    fn name(&self) -> &'static str;
}

type VersionMap = HashMap<(CaseId, String), Vec<Arc<Vec<u8>>>>;

/// An in-memory artifact store.
///
/// Useful for tests and for short-lived processes that only need the result
/// handed back, not persisted.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    blobs: RwLock<VersionMap>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of versions stored under a key.
    ///
    /// Returns 0 if the lock is poisoned.
    pub fn version_count(&self, case_id: &CaseId, category: &str) -> usize {
        self.blobs
            .read()
            .ok()
            .and_then(|b| b.get(&(case_id.clone(), category.to_string())).map(Vec::len))
            .unwrap_or(0)
    }

    /// Total number of versions across all keys.
    ///
    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.blobs
            .read()
            .map(|b| b.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn key_label(case_id: &CaseId, category: &str) -> String {
    format!("{}/{}", case_id, category)
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn get(
        &self,
        case_id: &CaseId,
        category: &str,
        version: Option<u32>,
    ) -> Result<Option<StoredArtifact>, StorageError> {
        let blobs = self.blobs.read().map_err(|_| StorageError::ReadFailed {
            key: key_label(case_id, category),
            message: "artifact store lock poisoned".to_string(),
        })?;
        let Some(versions) = blobs.get(&(case_id.clone(), category.to_string())) else {
            return Ok(None);
        };
        let index = match version {
            Some(v) => v as usize,
            None => versions.len(),
        };
        if index == 0 {
            return Ok(None);
        }
        Ok(versions.get(index - 1).map(|bytes| StoredArtifact {
            version: index as u32,
            bytes: Arc::clone(bytes),
        }))
    }

    async fn put(
        &self,
        case_id: &CaseId,
        category: &str,
        bytes: Vec<u8>,
    ) -> Result<u32, StorageError> {
        let mut blobs = self.blobs.write().map_err(|_| StorageError::WriteFailed {
            key: key_label(case_id, category),
            message: "artifact store lock poisoned".to_string(),
        })?;
        let versions = blobs
            .entry((case_id.clone(), category.to_string()))
            .or_default();
        versions.push(Arc::new(bytes));
        Ok(versions.len() as u32)
    }

    fn name(&self) -> &'static str {
        "InMemoryArtifactStore"
    }
}
