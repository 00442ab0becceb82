#![allow(dead_code)]

pub mod fake_render;
pub mod fixtures;
pub mod pdf_assertions;

use dossier::{
    ArtifactStore, AssemblyPipeline, CaseRepository, InMemoryCaseRepository, PipelineBuilder,
};
use fake_render::FakeRenderService;
use lopdf::Document as LopdfDocument;
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around an assembled PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Strings shown on each page, in page order.
    pub fn page_texts(&self) -> Vec<Vec<String>> {
        pdf_assertions::page_texts(&self.doc)
    }

    /// Save PDF to a file for manual debugging
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// A pipeline over the fake renderer, the fixture templates and the given
/// store, with the fixture case registered.
pub fn pipeline_with(
    render: &Arc<FakeRenderService>,
    store: Arc<dyn ArtifactStore>,
) -> AssemblyPipeline {
    pipeline_with_limit(render, store, 4)
}

pub fn pipeline_with_limit(
    render: &Arc<FakeRenderService>,
    store: Arc<dyn ArtifactStore>,
    max_concurrent_renders: usize,
) -> AssemblyPipeline {
    let repository = InMemoryCaseRepository::new();
    repository
        .insert(fixtures::case_record())
        .expect("case repository should accept the fixture case");
    let repository: Arc<dyn CaseRepository> = Arc::new(repository);

    PipelineBuilder::new()
        .with_render_service(render.clone())
        .with_templates(Arc::new(fixtures::templates()))
        .with_store(store)
        .with_case_repository(repository)
        .with_max_concurrent_renders(max_concurrent_renders)
        .build()
        .expect("pipeline should build")
}
