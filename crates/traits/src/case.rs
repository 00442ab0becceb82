//! CaseRepository trait for loading the facts a document is built from.

use async_trait::async_trait;
use dossier_types::{CaseId, CaseRecord};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaseDataError {
    #[error("Case not found: {0}")]
    NotFound(CaseId),

    #[error("Failed to load case '{case_id}': {message}")]
    LoadFailed { case_id: CaseId, message: String },
}

#[async_trait]
pub trait CaseRepository: Send + Sync {
    async fn load_case(&self, case_id: &CaseId) -> Result<CaseRecord, CaseDataError>;
}

/// A case repository backed by a map, pre-populated before use.
#[derive(Debug, Default)]
pub struct InMemoryCaseRepository {
    cases: RwLock<HashMap<CaseId, CaseRecord>>,
}

impl InMemoryCaseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a case record.
    ///
    /// # Errors
    ///
    /// Returns `CaseDataError::LoadFailed` if the internal lock is poisoned.
    pub fn insert(&self, record: CaseRecord) -> Result<(), CaseDataError> {
        let mut cases = self.cases.write().map_err(|_| CaseDataError::LoadFailed {
            case_id: record.case_id.clone(),
            message: "case store lock poisoned".to_string(),
        })?;
        cases.insert(record.case_id.clone(), record);
        Ok(())
    }
}

#[async_trait]
impl CaseRepository for InMemoryCaseRepository {
    async fn load_case(&self, case_id: &CaseId) -> Result<CaseRecord, CaseDataError> {
        let cases = self.cases.read().map_err(|_| CaseDataError::LoadFailed {
            case_id: case_id.clone(),
            message: "case store lock poisoned".to_string(),
        })?;
        cases
            .get(case_id)
            .cloned()
            .ok_or_else(|| CaseDataError::NotFound(case_id.clone()))
    }
}
