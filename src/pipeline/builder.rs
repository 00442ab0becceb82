use super::context::PipelineContext;
use super::orchestrator::AssemblyPipeline;
use crate::config::DossierConfig;
use crate::error::AssemblyError;
use dossier_pdf_composer::{DecorationStyle, PdfDecorator};
use dossier_render_client::HttpRenderClient;
use dossier_storage::{FilesystemArtifactStore, InMemoryArtifactStore};
use dossier_templating::HandlebarsTemplates;
use dossier_traits::{ArtifactStore, CaseRepository, RenderService, TemplateRenderer};
use log::info;
use std::sync::Arc;

const COMPONENT: &str = "PipelineBuilder";

/// A builder for creating an [`AssemblyPipeline`].
pub struct PipelineBuilder {
    render_service: Option<Arc<dyn RenderService>>,
    templates: Option<Arc<dyn TemplateRenderer>>,
    store: Option<Arc<dyn ArtifactStore>>,
    case_repository: Option<Arc<dyn CaseRepository>>,
    decoration_style: DecorationStyle,
    max_concurrent_renders: usize,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            render_service: None,
            templates: None,
            store: None,
            case_repository: None,
            decoration_style: DecorationStyle::default(),
            max_concurrent_renders: num_cpus::get(),
        }
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Wires the HTTP rendering client, the template directory and the
    /// filesystem store from configuration. The case repository still has to
    /// be supplied.
    pub async fn from_config(config: &DossierConfig) -> Result<Self, AssemblyError> {
        let client = HttpRenderClient::new(config.render_service.base_url.as_str())
            .map_err(|e| AssemblyError::configuration(COMPONENT, e.to_string()))?
            .with_timeout(config.render_service.timeout());

        let templates = HandlebarsTemplates::from_dir(&config.templates.dir).map_err(|source| {
            AssemblyError::Template {
                component: COMPONENT.to_string(),
                source,
            }
        })?;

        let store = FilesystemArtifactStore::new(config.storage.root.clone())
            .await
            .map_err(|e| AssemblyError::storage(COMPONENT, e))?;

        info!(
            "Configured pipeline: renderer at {}, {} templates, store at {}",
            client.base_url(),
            templates.template_names().len(),
            store.root().display()
        );

        Ok(Self::new()
            .with_render_service(Arc::new(client))
            .with_templates(Arc::new(templates))
            .with_store(Arc::new(store))
            .with_max_concurrent_renders(config.pipeline.max_concurrent_renders))
    }

    pub fn with_render_service(mut self, service: Arc<dyn RenderService>) -> Self {
        self.render_service = Some(service);
        self
    }

    pub fn with_templates(mut self, templates: Arc<dyn TemplateRenderer>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Defaults to an in-memory store when not set.
    pub fn with_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_case_repository(mut self, repository: Arc<dyn CaseRepository>) -> Self {
        self.case_repository = Some(repository);
        self
    }

    pub fn with_decoration_style(mut self, style: DecorationStyle) -> Self {
        self.decoration_style = style;
        self
    }

    /// Caps the number of section renders in flight for a single request.
    pub fn with_max_concurrent_renders(mut self, limit: usize) -> Self {
        self.max_concurrent_renders = limit;
        self
    }

    /// Consumes the builder and creates the `AssemblyPipeline`.
    pub fn build(self) -> Result<AssemblyPipeline, AssemblyError> {
        let render_service = self.render_service.ok_or_else(|| {
            AssemblyError::configuration(
                COMPONENT,
                "No rendering service has been configured. Use with_render_service() or from_config().",
            )
        })?;
        let templates = self.templates.ok_or_else(|| {
            AssemblyError::configuration(
                COMPONENT,
                "No templates have been configured. Use with_templates() or from_config().",
            )
        })?;
        let case_repository = self.case_repository.ok_or_else(|| {
            AssemblyError::configuration(
                COMPONENT,
                "No case repository has been configured. Use with_case_repository().",
            )
        })?;
        if self.max_concurrent_renders == 0 {
            return Err(AssemblyError::configuration(
                COMPONENT,
                "max_concurrent_renders must be at least 1",
            ));
        }
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryArtifactStore::new()));

        let context = PipelineContext {
            render_service,
            templates,
            store,
            case_repository,
            decorator: PdfDecorator::with_style(self.decoration_style),
            max_concurrent_renders: self.max_concurrent_renders,
        };
        Ok(AssemblyPipeline::new(context))
    }
}
