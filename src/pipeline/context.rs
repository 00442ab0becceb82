use dossier_pdf_composer::PdfDecorator;
use dossier_traits::{ArtifactStore, CaseRepository, RenderService, TemplateRenderer};
use std::sync::Arc;

/// Shared, read-only collaborators of an [`AssemblyPipeline`](super::AssemblyPipeline).
#[derive(Clone)]
pub struct PipelineContext {
    pub render_service: Arc<dyn RenderService>,
    pub templates: Arc<dyn TemplateRenderer>,
    pub store: Arc<dyn ArtifactStore>,
    pub case_repository: Arc<dyn CaseRepository>,
    pub decorator: PdfDecorator,
    /// Upper bound on section renders in flight for one request.
    pub max_concurrent_renders: usize,
}
