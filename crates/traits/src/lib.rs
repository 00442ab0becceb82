//! Collaborator seams for dossier assembly.
//!
//! The engine depends only on these traits; concrete implementations (HTTP
//! client, filesystem store, Handlebars templates) live in their own crates.

pub mod case;
pub mod render;
pub mod storage;
pub mod template;

pub use case::{CaseDataError, CaseRepository, InMemoryCaseRepository};
pub use render::{RenderError, RenderOperation, RenderOptions, RenderService};
pub use storage::{ArtifactStore, InMemoryArtifactStore, StorageError, StoredArtifact};
pub use template::{TemplateError, TemplateRenderer};
