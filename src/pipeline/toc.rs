use super::plan::TableOfContentsPlan;
use super::section::SectionRenderer;
use crate::error::AssemblyError;
use chrono::Local;
use dossier_types::{CaseRecord, RenderedSection, SectionContext, TableOfContentsEntry};
use log::warn;
use serde_json::{Map, Value};

pub(crate) const COMPONENT: &str = "TableOfContentsBuilder";

/// Builds the table-of-contents section from the rendered body sections.
pub struct TableOfContentsBuilder {
    renderer: SectionRenderer,
}

impl TableOfContentsBuilder {
    pub fn new(renderer: SectionRenderer) -> Self {
        Self { renderer }
    }

    /// One entry per section, in order. Start pages are 1-based and count
    /// body pages only.
    pub fn entries(sections: &[RenderedSection]) -> Vec<TableOfContentsEntry> {
        let mut current_page = 1;
        sections
            .iter()
            .map(|section| {
                if section.page_count == 0 {
                    warn!("[TOC] Section '{}' has no pages", section.name);
                }
                let entry = TableOfContentsEntry::new(section.name.clone(), current_page);
                current_page += section.page_count;
                entry
            })
            .collect()
    }

    pub async fn build(
        &self,
        case: &CaseRecord,
        plan: &TableOfContentsPlan,
        sections: &[RenderedSection],
    ) -> Result<RenderedSection, AssemblyError> {
        let entries = Self::entries(sections);
        let entries = serde_json::to_value(&entries)
            .map_err(|e| AssemblyError::task(COMPONENT, format!("could not serialise entries: {}", e)))?;

        let context = SectionContext::for_section(case, &plan.title, &Map::new())
            .with("entries", entries)
            .with("generatedOn", Value::String(Local::now().date_naive().to_string()));

        self.renderer
            .render_as(COMPONENT, &plan.title, &plan.template, &context, &[], &plan.options)
            .await
    }
}
