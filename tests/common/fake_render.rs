use super::fixtures::pdf_with_pages;
use async_trait::async_trait;
use dossier::{NamedBytes, RenderOptions, RenderService};
use dossier_pdf_composer::concatenate;
use dossier_traits::{RenderError, RenderOperation};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-process stand-in for the rendering service.
///
/// `convert_html` reads `data-label` and `data-pages` from the HTML and
/// returns a PDF with that many pages, each showing "{label} {n}". `merge_pdfs`
/// concatenates locally in part order. Every call is recorded.
#[derive(Default)]
pub struct FakeRenderService {
    delays: HashMap<String, Duration>,
    timeouts: HashSet<String>,
    corrupt: HashSet<String>,
    fail_merge: bool,
    drop_last_part: bool,
    convert_calls: AtomicUsize,
    merge_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    html: Mutex<Vec<String>>,
    merged_parts: Mutex<Vec<Vec<String>>>,
}

impl FakeRenderService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holds the render of `label` for `delay` before answering.
    pub fn with_delay(mut self, label: &str, delay: Duration) -> Self {
        self.delays.insert(label.to_string(), delay);
        self
    }

    pub fn with_timeout_for(mut self, label: &str) -> Self {
        self.timeouts.insert(label.to_string());
        self
    }

    /// Answers `label` with bytes that are not a PDF.
    pub fn with_corrupt_output_for(mut self, label: &str) -> Self {
        self.corrupt.insert(label.to_string());
        self
    }

    pub fn with_failing_merge(mut self) -> Self {
        self.fail_merge = true;
        self
    }

    /// Merges every part except the last one.
    pub fn with_merge_dropping_last_part(mut self) -> Self {
        self.drop_last_part = true;
        self
    }

    pub fn convert_calls(&self) -> usize {
        self.convert_calls.load(Ordering::SeqCst)
    }

    pub fn merge_calls(&self) -> usize {
        self.merge_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn rendered_html(&self) -> Vec<String> {
        self.html.lock().unwrap().clone()
    }

    /// The HTML rendered for the section labelled `label`.
    pub fn html_for(&self, label: &str) -> Option<String> {
        let needle = format!(r#"data-label="{}""#, label);
        self.rendered_html().into_iter().find(|h| h.contains(&needle))
    }

    /// Part names of every merge call, in the order they were sent.
    pub fn merged_parts(&self) -> Vec<Vec<String>> {
        self.merged_parts.lock().unwrap().clone()
    }
}

fn attribute<'a>(html: &'a str, name: &str) -> Option<&'a str> {
    let marker = format!(r#"{}=""#, name);
    let start = html.find(&marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    Some(&html[start..end])
}

#[async_trait]
impl RenderService for FakeRenderService {
    async fn convert_html(
        &self,
        caller: &str,
        html: &str,
        _images: &[NamedBytes],
        _options: &RenderOptions,
    ) -> Result<Vec<u8>, RenderError> {
        self.convert_calls.fetch_add(1, Ordering::SeqCst);
        self.html.lock().unwrap().push(html.to_string());

        let label = attribute(html, "data-label").unwrap_or("Untitled").to_string();
        let pages = attribute(html, "data-pages")
            .and_then(|p| p.parse().ok())
            .unwrap_or(1);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&label) {
            tokio::time::sleep(*delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.timeouts.contains(&label) {
            return Err(RenderError::Timeout {
                caller: caller.to_string(),
                operation: RenderOperation::ConvertHtml,
                timeout: Duration::from_millis(10),
            });
        }
        if self.corrupt.contains(&label) {
            return Ok(b"<html>not a pdf</html>".to_vec());
        }
        Ok(pdf_with_pages(&label, pages))
    }

    async fn merge_pdfs(&self, caller: &str, parts: &[NamedBytes]) -> Result<Vec<u8>, RenderError> {
        self.merge_calls.fetch_add(1, Ordering::SeqCst);
        self.merged_parts
            .lock()
            .unwrap()
            .push(parts.iter().map(|p| p.name.clone()).collect());

        if self.fail_merge {
            return Err(RenderError::Service {
                caller: caller.to_string(),
                operation: RenderOperation::MergePdfs,
                status: 500,
                body: "merge failed".to_string(),
            });
        }

        let kept = if self.drop_last_part { parts.len().saturating_sub(1) } else { parts.len() };
        let slices: Vec<&[u8]> = parts[..kept].iter().map(|p| p.bytes.as_slice()).collect();
        concatenate(&slices).map_err(|e| RenderError::Service {
            caller: caller.to_string(),
            operation: RenderOperation::MergePdfs,
            status: 422,
            body: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "FakeRenderService"
    }
}
