//! HTTP client for the external rendering service.
//!
//! Implements [`dossier_traits::RenderService`] over three endpoints:
//!
//! - `POST /convert/html`: multipart `files` (`index.html` plus images) and
//!   scalar option fields; the response body is the PDF
//! - `POST /merge`: multipart `files`, one complete PDF per part, merged in
//!   field order
//! - `GET /health`: any 2xx status is healthy

mod client;
mod error;
mod metrics;

pub use client::{DEFAULT_TIMEOUT, HttpRenderClient};
pub use error::ClientError;
pub use metrics::{MetricsSnapshot, OperationStats, RenderMetrics};
