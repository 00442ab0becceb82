//! Artifact stores for assembled documents and stored attachments.
//!
//! ## Available Stores
//!
//! - [`FilesystemArtifactStore`]: one file per version under a root directory
//!
//! ## Re-exports
//!
//! For convenience, we also re-export the in-memory store from dossier-traits:
//! - [`InMemoryArtifactStore`]: process-local storage for tests and embedding

mod filesystem;

pub use filesystem::FilesystemArtifactStore;

pub use dossier_traits::InMemoryArtifactStore;
