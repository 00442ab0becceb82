use crate::error::AssemblyError;
use dossier_pdf_composer::count_pages;
use dossier_traits::{RenderOptions, RenderService, TemplateRenderer};
use dossier_types::{NamedBytes, RenderedSection, SectionContext};
use log::debug;
use std::sync::Arc;
use std::time::Instant;

pub(crate) const COMPONENT: &str = "SectionRenderer";

/// Turns one section template into PDF bytes: template to HTML, HTML to PDF
/// through the rendering service, then a page count read back from the PDF.
#[derive(Clone)]
pub struct SectionRenderer {
    render_service: Arc<dyn RenderService>,
    templates: Arc<dyn TemplateRenderer>,
}

impl SectionRenderer {
    pub fn new(render_service: Arc<dyn RenderService>, templates: Arc<dyn TemplateRenderer>) -> Self {
        Self {
            render_service,
            templates,
        }
    }

    pub async fn render_section(
        &self,
        name: &str,
        template: &str,
        context: &SectionContext,
        images: &[NamedBytes],
        options: &RenderOptions,
    ) -> Result<RenderedSection, AssemblyError> {
        self.render_as(COMPONENT, name, template, context, images, options).await
    }

    /// Same as [`render_section`](Self::render_section), attributed to `component`.
    pub(crate) async fn render_as(
        &self,
        component: &str,
        name: &str,
        template: &str,
        context: &SectionContext,
        images: &[NamedBytes],
        options: &RenderOptions,
    ) -> Result<RenderedSection, AssemblyError> {
        let start = Instant::now();
        let html = self
            .templates
            .render(template, context)
            .map_err(|source| AssemblyError::Template {
                component: component.to_string(),
                source,
            })?;

        let pdf_bytes = self
            .render_service
            .convert_html(component, &html, images, options)
            .await
            .map_err(|e| AssemblyError::render(component, e))?;

        let page_count = count_pages(&pdf_bytes).map_err(|e| AssemblyError::composer(component, name, e))?;
        debug!(
            "[SECTION] Rendered '{}' ({} pages) in {:.2?}",
            name,
            page_count,
            start.elapsed()
        );

        Ok(RenderedSection {
            name: name.to_string(),
            pdf_bytes,
            page_count,
        })
    }
}
