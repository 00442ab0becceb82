//! PDF post-processing for assembled documents.
//!
//! This crate provides the low-level PDF work done after rendering, using lopdf:
//! - Page counting
//! - Page numbers, headers and footers stamped by page position
//! - Page-tree merging with deep object copy

mod decorator;
mod error;
mod merge;
mod page;
mod text;

pub use decorator::{Anchor, DecorationStyle, PdfDecorator, Stamp};
pub use error::ComposerError;
pub use merge::{concatenate, merge_documents};
pub use page::{PageBox, media_box, overlay_content};
pub use text::{StampFont, encode_win_ansi};

use lopdf::Document;

pub(crate) fn load(pdf: &[u8]) -> Result<Document, ComposerError> {
    Document::load_mem(pdf).map_err(|e| ComposerError::MalformedDocument(e.to_string()))
}

pub(crate) fn save(doc: &mut Document) -> Result<Vec<u8>, ComposerError> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Number of pages in a complete PDF.
pub fn count_pages(pdf: &[u8]) -> Result<usize, ComposerError> {
    Ok(load(pdf)?.get_pages().len())
}
