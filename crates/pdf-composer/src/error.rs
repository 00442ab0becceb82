use dossier_types::NumberingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    /// The buffer could not be parsed as a PDF at all.
    #[error("Malformed PDF document: {0}")]
    MalformedDocument(String),

    #[error("Invalid numbering configuration: {0}")]
    InvalidNumbering(#[from] NumberingError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error while writing PDF: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
