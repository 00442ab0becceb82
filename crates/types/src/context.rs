//! Case facts and the per-section template variables derived from them.

use crate::ids::CaseId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// The facts known about one case, as delivered by the case repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: CaseId,
    pub facts: Map<String, Value>,
}

impl CaseRecord {
    pub fn new(case_id: impl Into<CaseId>, facts: Map<String, Value>) -> Self {
        Self {
            case_id: case_id.into(),
            facts,
        }
    }

    /// A fact counts as present when its key exists and is not `null`.
    pub fn has_fact(&self, key: &str) -> bool {
        self.facts.get(key).is_some_and(|v| !v.is_null())
    }
}

/// Template variables for one section. Built once per assembly request and
/// never mutated afterwards; clones share the same map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionContext {
    variables: Arc<Map<String, Value>>,
}

impl SectionContext {
    pub fn new(variables: Map<String, Value>) -> Self {
        Self {
            variables: Arc::new(variables),
        }
    }

    /// Case facts overlaid with section-specific variables. The section name
    /// is exposed as `sectionName` and the case id as `caseId`.
    pub fn for_section(case: &CaseRecord, section_name: &str, extra: &Map<String, Value>) -> Self {
        let mut variables = case.facts.clone();
        for (k, v) in extra {
            variables.insert(k.clone(), v.clone());
        }
        variables.insert("sectionName".into(), Value::String(section_name.to_string()));
        variables.insert("caseId".into(), Value::String(case.case_id.to_string()));
        Self::new(variables)
    }

    /// Returns a new context with one more variable set.
    pub fn with(&self, key: impl Into<String>, value: Value) -> Self {
        let mut variables = (*self.variables).clone();
        variables.insert(key.into(), value);
        Self::new(variables)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    pub fn to_value(&self) -> Value {
        Value::Object((*self.variables).clone())
    }
}
