//! Document assembly orchestration.
//!
//! - [`PipelineBuilder`]: Fluent builder wiring the collaborators
//! - [`AssemblyPipeline`]: Runs one [`DocumentPlan`] end to end
//! - [`SectionRenderer`]: Template to HTML to PDF for one section
//! - [`TableOfContentsBuilder`]: Start pages from rendered page counts
//!
//! # Example
//!
//! ```ignore
//! use dossier::{DocumentPlan, PipelineBuilder, SectionPlan};
//!
//! let pipeline = PipelineBuilder::from_config(&config)
//!     .await?
//!     .with_case_repository(repository)
//!     .build()?;
//!
//! let plan = DocumentPlan::dossier("DOSSIER", "toc")
//!     .with_section(SectionPlan::template("Licence", "licence"))
//!     .with_section(SectionPlan::template("Report", "report"));
//!
//! let outcome = pipeline.assemble(&case_id, plan).await?;
//! ```

mod builder;
pub mod context;
mod orchestrator;
pub mod plan;
mod section;
mod toc;

pub use builder::PipelineBuilder;
pub use context::PipelineContext;
pub use orchestrator::{AssemblyOutcome, AssemblyPipeline};
pub use plan::{Decoration, DocumentPlan, SectionPlan, SectionSource, TableOfContentsPlan};
pub use section::SectionRenderer;
pub use toc::TableOfContentsBuilder;
