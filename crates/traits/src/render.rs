//! RenderService trait: the boundary to the external HTML-to-PDF service.
//!
//! Two operations exist: converting an HTML body (plus auxiliary images) to
//! a PDF, and merging complete PDFs in the order given. Implementations make
//! exactly one attempt per call; callers never retry silently.

use async_trait::async_trait;
use dossier_types::NamedBytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The remote operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderOperation {
    ConvertHtml,
    MergePdfs,
    Health,
}

impl fmt::Display for RenderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderOperation::ConvertHtml => "ConvertHtml",
            RenderOperation::MergePdfs => "MergePdfs",
            RenderOperation::Health => "Health",
        };
        f.write_str(name)
    }
}

/// Error type for rendering service calls. Every variant names the calling
/// component so a failure can be traced without log correlation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("{caller}: {operation} timed out after {timeout:?}")]
    Timeout {
        caller: String,
        operation: RenderOperation,
        timeout: Duration,
    },

    #[error("{caller}: {operation} returned status {status}: {body}")]
    Service {
        caller: String,
        operation: RenderOperation,
        status: u16,
        body: String,
    },

    #[error("{caller}: {operation} transport failure: {message}")]
    Transport {
        caller: String,
        operation: RenderOperation,
        message: String,
    },
}

impl RenderError {
    pub fn caller(&self) -> &str {
        match self {
            RenderError::Timeout { caller, .. }
            | RenderError::Service { caller, .. }
            | RenderError::Transport { caller, .. } => caller,
        }
    }

    pub fn operation(&self) -> RenderOperation {
        match self {
            RenderError::Timeout { operation, .. }
            | RenderError::Service { operation, .. }
            | RenderError::Transport { operation, .. } => *operation,
        }
    }
}

/// Scalar rendering options sent as plain form fields alongside the HTML
/// (e.g. page margins).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderOptions(BTreeMap<String, Value>);

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// All four page margins set to zero; the HTML controls its own spacing.
    pub fn zero_margins() -> Self {
        Self::new()
            .with("marginTop", 0)
            .with("marginBottom", 0)
            .with("marginLeft", 0)
            .with("marginRight", 0)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Options rendered as form field pairs. Strings are sent verbatim, other
    /// scalars in their JSON spelling; nested values are skipped.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((k.clone(), text))
            })
            .collect()
    }
}

/// The two operations of the external rendering service.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Converts an HTML body to PDF bytes. `caller` identifies the component
    /// on whose behalf the call is made.
    async fn convert_html(
        &self,
        caller: &str,
        html: &str,
        images: &[NamedBytes],
        options: &RenderOptions,
    ) -> Result<Vec<u8>, RenderError>;

    /// Merges complete PDFs. The output pages follow `parts` order exactly.
    async fn merge_pdfs(&self, caller: &str, parts: &[NamedBytes]) -> Result<Vec<u8>, RenderError>;

    /// Returns a human-readable name for this service (for logging/debugging).
    fn name(&self) -> &'static str;
}
