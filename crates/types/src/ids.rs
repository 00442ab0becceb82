//! Newtype wrappers for case identifiers and persistence keys.
//!
//! These keep case ids, document categories and versions from being mixed up
//! as bare strings and integers when they cross the storage boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of the case a document is assembled for.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(Arc<str>);

impl CaseId {
    /// Creates a new CaseId from a string
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this case ID
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CaseId {
    fn default() -> Self {
        CaseId::new("")
    }
}

impl From<String> for CaseId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for CaseId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for CaseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The key under which a final artifact is persisted: one case, one
/// document category. Versions live below this key.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceKey {
    pub case_id: CaseId,
    pub category: String,
}

impl PersistenceKey {
    pub fn new(case_id: impl Into<CaseId>, category: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            category: category.into(),
        }
    }
}

impl fmt::Display for PersistenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.case_id, self.category)
    }
}

/// A reference to a stored attachment: a category plus an optional version
/// (`None` means the latest version).
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReference {
    pub case_id: CaseId,
    pub category: String,
    pub version: Option<u32>,
}

impl fmt::Display for StoredReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(v) => write!(f, "{}/{}@v{}", self.case_id, self.category, v),
            None => write!(f, "{}/{}@latest", self.case_id, self.category),
        }
    }
}
