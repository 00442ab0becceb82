use crate::ids::{PersistenceKey, StoredReference};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

/// A named blob handed to the rendering service: an HTML body, an auxiliary
/// image or a complete PDF to merge.
#[derive(Clone, PartialEq, Eq)]
pub struct NamedBytes {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedBytes {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for NamedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedBytes")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Where the content of a [`DocumentPart`] comes from.
pub enum PartSource {
    /// Bytes already in memory.
    Bytes(Vec<u8>),
    /// A reader that yields the bytes once.
    Stream(Box<dyn Read + Send>),
    /// An attachment held by the artifact store.
    Stored(StoredReference),
}

impl PartSource {
    /// Resolves sources that need no store access. A `Stored` source is
    /// handed back untouched so the caller can fetch it.
    pub fn read_local(self) -> std::io::Result<Result<Vec<u8>, StoredReference>> {
        match self {
            PartSource::Bytes(bytes) => Ok(Ok(bytes)),
            PartSource::Stream(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok(Ok(buf))
            }
            PartSource::Stored(reference) => Ok(Err(reference)),
        }
    }
}

impl fmt::Debug for PartSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartSource::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            PartSource::Stream(_) => write!(f, "Stream(..)"),
            PartSource::Stored(r) => write!(f, "Stored({})", r),
        }
    }
}

/// A named unit of content to be merged. The ordinal is the sole
/// determinant of merge order.
#[derive(Debug)]
pub struct DocumentPart {
    pub ordinal: usize,
    pub name: String,
    pub source: PartSource,
}

/// One section after rendering: its PDF bytes and the page count read back
/// from those bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedSection {
    pub name: String,
    pub pdf_bytes: Vec<u8>,
    pub page_count: usize,
}

impl RenderedSection {
    pub fn to_named_bytes(&self) -> NamedBytes {
        NamedBytes::new(format!("{}.pdf", self.name), self.pdf_bytes.clone())
    }
}

impl fmt::Debug for RenderedSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedSection")
            .field("name", &self.name)
            .field("bytes", &self.pdf_bytes.len())
            .field("page_count", &self.page_count)
            .finish()
    }
}

/// An entry in the table of contents. `start_page` is 1-based and relative
/// to the body, not counting the table of contents itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOfContentsEntry {
    pub title: String,
    pub start_page: usize,
}

impl TableOfContentsEntry {
    pub fn new(title: impl Into<String>, start_page: usize) -> Self {
        Self {
            title: title.into(),
            start_page,
        }
    }
}

/// The final merged and decorated document.
#[derive(Clone, PartialEq, Eq)]
pub struct AssemblyResult {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Set when the result was persisted (or read back) under a key.
    pub key: Option<PersistenceKey>,
    pub version: Option<u32>,
}

impl fmt::Debug for AssemblyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssemblyResult")
            .field("bytes", &self.bytes.len())
            .field("page_count", &self.page_count)
            .field("key", &self.key)
            .field("version", &self.version)
            .finish()
    }
}
