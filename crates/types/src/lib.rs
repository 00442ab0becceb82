//! Data model shared by every stage of dossier assembly.

pub mod context;
pub mod document;
pub mod ids;
pub mod numbering;

pub use context::{CaseRecord, SectionContext};
pub use document::{
    AssemblyResult, DocumentPart, NamedBytes, PartSource, RenderedSection, TableOfContentsEntry,
};
pub use ids::{CaseId, PersistenceKey, StoredReference};
pub use numbering::{NumberingError, NumberingSpec};
