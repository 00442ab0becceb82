use crate::error::ClientError;
use crate::metrics::{MetricsSnapshot, RenderMetrics};
use async_trait::async_trait;
use dossier_traits::{RenderError, RenderOperation, RenderOptions, RenderService};
use dossier_types::NamedBytes;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default per-call deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const HTML_FILE_NAME: &str = "index.html";

/// Client for the external rendering service.
///
/// Every call makes exactly one attempt under the configured timeout.
/// Failures are counted in [`RenderMetrics`] and returned tagged with the
/// calling component; nothing is retried here.
#[derive(Debug, Clone)]
pub struct HttpRenderClient {
    base_url: String,
    client: Client,
    timeout: Duration,
    metrics: Arc<RenderMetrics>,
}

impl HttpRenderClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        match Url::parse(&base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ClientError::InvalidBaseUrl(base_url)),
        }
        let client = Client::builder().build()?;
        Ok(Self {
            base_url,
            client,
            timeout: DEFAULT_TIMEOUT,
            metrics: Arc::new(RenderMetrics::default()),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// `GET /health`. Any 2xx status means healthy; other statuses return
    /// `Ok(false)`, transport failures an error.
    pub async fn health(&self, caller: &str) -> Result<bool, RenderError> {
        let operation = RenderOperation::Health;
        self.metrics.record_attempt(operation);
        let request = self.client.get(format!("{}/health", self.base_url));
        match request.timeout(self.timeout).send().await {
            Ok(response) => {
                let healthy = response.status().is_success();
                if !healthy {
                    self.metrics.record_error(operation);
                    warn!("[RENDER-CLIENT] {}: health check returned {}", caller, response.status());
                }
                Ok(healthy)
            }
            Err(err) => Err(self.record_failure(self.classify(caller, operation, err))),
        }
    }

    fn classify(&self, caller: &str, operation: RenderOperation, err: reqwest::Error) -> RenderError {
        if err.is_timeout() {
            RenderError::Timeout {
                caller: caller.to_string(),
                operation,
                timeout: self.timeout,
            }
        } else {
            RenderError::Transport {
                caller: caller.to_string(),
                operation,
                message: err.to_string(),
            }
        }
    }

    fn record_failure(&self, err: RenderError) -> RenderError {
        match &err {
            RenderError::Timeout { operation, .. } => self.metrics.record_timeout(*operation),
            other => self.metrics.record_error(other.operation()),
        }
        warn!("[RENDER-CLIENT] {}", err);
        err
    }

    async fn send(
        &self,
        caller: &str,
        operation: RenderOperation,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, RenderError> {
        self.metrics.record_attempt(operation);
        let started = Instant::now();
        let result = self.execute(caller, operation, request).await;
        match result {
            Ok(bytes) => {
                debug!(
                    "[RENDER-CLIENT] {} {} returned {} bytes in {:?}",
                    caller,
                    operation,
                    bytes.len(),
                    started.elapsed()
                );
                Ok(bytes)
            }
            Err(err) => Err(self.record_failure(err)),
        }
    }

    async fn execute(
        &self,
        caller: &str,
        operation: RenderOperation,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, RenderError> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(caller, operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RenderError::Service {
                caller: caller.to_string(),
                operation,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify(caller, operation, e))?;
        Ok(bytes.to_vec())
    }

    fn file_part(
        &self,
        caller: &str,
        operation: RenderOperation,
        file: &NamedBytes,
        mime: &str,
    ) -> Result<Part, RenderError> {
        Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(mime)
            .map_err(|e| self.classify(caller, operation, e))
    }
}

fn image_mime(name: &str) -> &'static str {
    let extension = name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl RenderService for HttpRenderClient {
    async fn convert_html(
        &self,
        caller: &str,
        html: &str,
        images: &[NamedBytes],
        options: &RenderOptions,
    ) -> Result<Vec<u8>, RenderError> {
        let operation = RenderOperation::ConvertHtml;
        let index = NamedBytes::new(HTML_FILE_NAME, html.as_bytes());
        let mut form = Form::new().part("files", self.file_part(caller, operation, &index, "text/html")?);
        for image in images {
            form = form.part("files", self.file_part(caller, operation, image, image_mime(&image.name))?);
        }
        for (key, value) in options.form_fields() {
            form = form.text(key, value);
        }

        let request = self
            .client
            .post(format!("{}/convert/html", self.base_url))
            .multipart(form);
        self.send(caller, operation, request).await
    }

    async fn merge_pdfs(&self, caller: &str, parts: &[NamedBytes]) -> Result<Vec<u8>, RenderError> {
        let operation = RenderOperation::MergePdfs;
        let mut form = Form::new();
        for part in parts {
            form = form.part("files", self.file_part(caller, operation, part, "application/pdf")?);
        }

        let request = self
            .client
            .post(format!("{}/merge", self.base_url))
            .multipart(form);
        self.send(caller, operation, request).await
    }

    fn name(&self) -> &'static str {
        "HttpRenderClient"
    }
}
