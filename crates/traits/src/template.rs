//! TemplateRenderer trait: turns a section context into an HTML string.

use dossier_types::SectionContext;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Failed to render template '{template}': {message}")]
    RenderFailed { template: String, message: String },

    #[error("Failed to load template '{path}': {message}")]
    LoadFailed { path: String, message: String },
}

/// Template-variable substitution. The template language is up to the
/// implementation; the engine only sees names in and HTML out.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template_name: &str, context: &SectionContext) -> Result<String, TemplateError>;

    /// Check if a template is registered.
    fn has_template(&self, template_name: &str) -> bool;
}
