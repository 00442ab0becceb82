//! Handlebars implementation of [`dossier_traits::TemplateRenderer`].
//!
//! Templates are registered by name, either one by one or from a directory
//! of `*.hbs` files (registered under their file stem). Output is HTML, so
//! variables are escaped by default.

use chrono::{DateTime, NaiveDate};
use dossier_traits::{TemplateError, TemplateRenderer};
use dossier_types::SectionContext;
use handlebars::{Handlebars, handlebars_helper};
use log::debug;
use std::path::Path;

const TEMPLATE_EXTENSION: &str = "hbs";
const DATE_FORMAT: &str = "%d %B %Y";

/// Renders `2024-03-05` or an RFC 3339 timestamp as `05 March 2024`.
/// Anything unparseable is passed through unchanged.
fn format_date(value: &str) -> String {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.format(DATE_FORMAT).to_string();
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return timestamp.date_naive().format(DATE_FORMAT).to_string();
    }
    value.to_string()
}

handlebars_helper!(format_date_helper: |value: str| format_date(value));

#[derive(Debug)]
pub struct HandlebarsTemplates {
    registry: Handlebars<'static>,
}

impl Default for HandlebarsTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlebarsTemplates {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_helper("formatDate", Box::new(format_date_helper));
        Self { registry }
    }

    /// Missing variables become render errors instead of empty strings.
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.registry.set_strict_mode(strict);
        self
    }

    pub fn register(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| TemplateError::LoadFailed {
                path: name.to_string(),
                message: e.to_string(),
            })
    }

    /// Registers every `*.hbs` file directly inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let dir = dir.as_ref();
        let load_failed = |message: String| TemplateError::LoadFailed {
            path: dir.display().to_string(),
            message,
        };

        let mut templates = Self::new();
        let entries = std::fs::read_dir(dir).map_err(|e| load_failed(e.to_string()))?;
        for entry in entries {
            let path = entry.map_err(|e| load_failed(e.to_string()))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = std::fs::read_to_string(&path).map_err(|e| TemplateError::LoadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            templates.register(name, &source)?;
            debug!("Registered template '{}' from {}", name, path.display());
        }
        Ok(templates)
    }

    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.get_templates().keys().cloned().collect();
        names.sort();
        names
    }
}

impl TemplateRenderer for HandlebarsTemplates {
    fn render(&self, template_name: &str, context: &SectionContext) -> Result<String, TemplateError> {
        if !self.registry.has_template(template_name) {
            return Err(TemplateError::NotFound(template_name.to_string()));
        }
        self.registry
            .render(template_name, &context.to_value())
            .map_err(|e| TemplateError::RenderFailed {
                template: template_name.to_string(),
                message: e.to_string(),
            })
    }

    fn has_template(&self, template_name: &str) -> bool {
        self.registry.has_template(template_name)
    }
}
