//! Filesystem-based artifact store.
//!
//! Artifacts live at `<root>/<case>/<category>/v<N>.pdf`. Case ids and
//! categories are used as single path segments and are validated so that no
//! key can resolve outside the root directory.

use async_trait::async_trait;
use dossier_traits::{ArtifactStore, StorageError, StoredArtifact};
use dossier_types::CaseId;
use log::debug;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

const FILE_EXTENSION: &str = "pdf";

/// An artifact store that keeps every version as a separate file.
///
/// New versions are written to a temporary file and renamed into place, so
/// a reader never observes a partially written artifact. Puts from the same
/// process are serialised to keep version numbers dense.
#[derive(Debug)]
pub struct FilesystemArtifactStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FilesystemArtifactStore {
    /// Creates the store, creating `root` if it does not exist yet.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Highest stored version for a key, or `None` when nothing is stored.
    pub async fn latest_version(&self, case_id: &CaseId, category: &str) -> Result<Option<u32>, StorageError> {
        let dir = self.key_dir(case_id, category)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    key: key_label(case_id, category),
                    message: e.to_string(),
                });
            }
        };

        let mut latest = None;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(version) = parse_version(&entry.file_name().to_string_lossy()) {
                latest = latest.max(Some(version));
            }
        }
        Ok(latest)
    }

    fn key_dir(&self, case_id: &CaseId, category: &str) -> Result<PathBuf, StorageError> {
        let key = key_label(case_id, category);
        if !is_safe_segment(case_id.as_str()) || !is_safe_segment(category) {
            return Err(StorageError::ReadFailed {
                key,
                message: "key is not a single relative path segment".to_string(),
            });
        }
        Ok(self.root.join(case_id.as_str()).join(category))
    }
}

fn key_label(case_id: &CaseId, category: &str) -> String {
    format!("{}/{}", case_id, category)
}

fn version_file_name(version: u32) -> String {
    format!("v{}.{}", version, FILE_EXTENSION)
}

fn parse_version(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix('v')?
        .strip_suffix(FILE_EXTENSION)?
        .strip_suffix('.')?
        .parse()
        .ok()
        .filter(|v| *v > 0)
}

/// A segment is safe when it is exactly one normal path component.
fn is_safe_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !segment.contains(['/', '\\'])
}

#[async_trait]
impl ArtifactStore for FilesystemArtifactStore {
    async fn get(
        &self,
        case_id: &CaseId,
        category: &str,
        version: Option<u32>,
    ) -> Result<Option<StoredArtifact>, StorageError> {
        let version = match version {
            Some(0) => return Ok(None),
            Some(v) => v,
            None => match self.latest_version(case_id, category).await? {
                Some(v) => v,
                None => return Ok(None),
            },
        };

        let path = self.key_dir(case_id, category)?.join(version_file_name(version));
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(StoredArtifact {
                version,
                bytes: Arc::new(bytes),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key_label(case_id, category),
                message: e.to_string(),
            }),
        }
    }

    async fn put(
        &self,
        case_id: &CaseId,
        category: &str,
        bytes: Vec<u8>,
    ) -> Result<u32, StorageError> {
        let dir = self.key_dir(case_id, category)?;
        let write_failed = |e: std::io::Error| StorageError::WriteFailed {
            key: key_label(case_id, category),
            message: e.to_string(),
        };

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&dir).await.map_err(write_failed)?;
        let version = self.latest_version(case_id, category).await?.unwrap_or(0) + 1;

        let final_path = dir.join(version_file_name(version));
        let temp_path = dir.join(format!(".{}.tmp", version_file_name(version)));
        tokio::fs::write(&temp_path, &bytes).await.map_err(write_failed)?;
        tokio::fs::rename(&temp_path, &final_path).await.map_err(write_failed)?;

        debug!(
            "[STORAGE] Stored {} bytes as {} v{}",
            bytes.len(),
            key_label(case_id, category),
            version
        );
        Ok(version)
    }

    fn name(&self) -> &'static str {
        "FilesystemArtifactStore"
    }
}
