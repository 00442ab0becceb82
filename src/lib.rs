//! Assembly of multi-section case documents.
//!
//! A document is described by a [`DocumentPlan`]: an ordered list of
//! sections (HTML templates or ready-made PDF attachments), an optional
//! table of contents and a decoration. The [`AssemblyPipeline`] renders every
//! section concurrently through an external HTML-to-PDF service, builds the
//! table of contents from the rendered page counts, merges the parts in
//! declared order, stamps page numbers or headers, and persists the result
//! once per case and category.
//!
//! The collaborators are traits from `dossier-traits`; the crates under
//! `crates/` provide the HTTP client, filesystem store and Handlebars
//! templates used by [`PipelineBuilder::from_config`].

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::DossierConfig;
pub use error::AssemblyError;
pub use pipeline::{
    AssemblyOutcome, AssemblyPipeline, Decoration, DocumentPlan, PipelineBuilder, SectionPlan,
    SectionRenderer, SectionSource, TableOfContentsBuilder, TableOfContentsPlan,
};

pub use dossier_pdf_composer::{DecorationStyle, PdfDecorator};
pub use dossier_traits::{
    ArtifactStore, CaseRepository, InMemoryArtifactStore, InMemoryCaseRepository, RenderOptions,
    RenderService, TemplateRenderer,
};
pub use dossier_types::{
    AssemblyResult, CaseId, CaseRecord, DocumentPart, NamedBytes, NumberingSpec, PartSource,
    PersistenceKey, RenderedSection, SectionContext, StoredReference, TableOfContentsEntry,
};
