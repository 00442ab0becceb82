use dossier_pdf_composer::ComposerError;
use dossier_traits::{CaseDataError, RenderError, StorageError, TemplateError};
use dossier_types::CaseId;
use thiserror::Error;

/// A comprehensive error type for document assembly.
///
/// Every variant names the component that raised it, so a failure can be
/// traced to the external dependency involved without correlating logs.
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("[{component}] rendering service timed out: {source}")]
    RenderTimeout {
        component: String,
        #[source]
        source: RenderError,
    },

    #[error("[{component}] rendering service failed: {source}")]
    RenderService {
        component: String,
        #[source]
        source: RenderError,
    },

    #[error("[{component}] could not reach rendering service: {source}")]
    Transport {
        component: String,
        #[source]
        source: RenderError,
    },

    #[error("[{component}] malformed PDF for '{document}': {message}")]
    MalformedDocument {
        component: String,
        document: String,
        message: String,
    },

    #[error("[{component}] case {case_id} is missing required fact '{fact}'")]
    PreconditionUnmet {
        component: String,
        case_id: CaseId,
        fact: String,
    },

    #[error("[{component}] invalid configuration: {message}")]
    Configuration { component: String, message: String },

    #[error("[{component}] storage failure: {source}")]
    Storage {
        component: String,
        #[source]
        source: StorageError,
    },

    #[error("[{component}] template failure: {source}")]
    Template {
        component: String,
        #[source]
        source: TemplateError,
    },

    #[error("[{component}] case data unavailable: {source}")]
    CaseData {
        component: String,
        #[source]
        source: CaseDataError,
    },

    #[error("[{component}] task failed: {message}")]
    Task { component: String, message: String },
}

impl AssemblyError {
    /// The component that raised the error.
    pub fn component(&self) -> &str {
        match self {
            AssemblyError::RenderTimeout { component, .. }
            | AssemblyError::RenderService { component, .. }
            | AssemblyError::Transport { component, .. }
            | AssemblyError::MalformedDocument { component, .. }
            | AssemblyError::PreconditionUnmet { component, .. }
            | AssemblyError::Configuration { component, .. }
            | AssemblyError::Storage { component, .. }
            | AssemblyError::Template { component, .. }
            | AssemblyError::CaseData { component, .. }
            | AssemblyError::Task { component, .. } => component,
        }
    }

    pub(crate) fn render(component: &str, source: RenderError) -> Self {
        let component = component.to_string();
        match source {
            RenderError::Timeout { .. } => AssemblyError::RenderTimeout { component, source },
            RenderError::Service { .. } => AssemblyError::RenderService { component, source },
            RenderError::Transport { .. } => AssemblyError::Transport { component, source },
        }
    }

    pub(crate) fn composer(component: &str, document: &str, source: ComposerError) -> Self {
        match source {
            ComposerError::InvalidNumbering(e) => AssemblyError::configuration(component, e.to_string()),
            other => AssemblyError::MalformedDocument {
                component: component.to_string(),
                document: document.to_string(),
                message: other.to_string(),
            },
        }
    }

    pub(crate) fn configuration(component: &str, message: impl Into<String>) -> Self {
        AssemblyError::Configuration {
            component: component.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn storage(component: &str, source: StorageError) -> Self {
        AssemblyError::Storage {
            component: component.to_string(),
            source,
        }
    }

    pub(crate) fn task(component: &str, message: impl Into<String>) -> Self {
        AssemblyError::Task {
            component: component.to_string(),
            message: message.into(),
        }
    }
}
