use thiserror::Error;

/// Errors raised while constructing a client, before any request is sent.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid rendering service URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
