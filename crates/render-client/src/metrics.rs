//! Per-operation call counters for the rendering service client.

use dossier_traits::RenderOperation;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
struct OperationCounters {
    attempts: AtomicU64,
    timeouts: AtomicU64,
    errors: AtomicU64,
}

impl OperationCounters {
    fn snapshot(&self) -> OperationStats {
        OperationStats {
            attempts: self.attempts.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Counters for one remote operation. `errors` counts every failure,
/// including timeouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationStats {
    pub attempts: u64,
    pub timeouts: u64,
    pub errors: u64,
}

/// A point-in-time copy of [`RenderMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub convert_html: OperationStats,
    pub merge_pdfs: OperationStats,
    pub health: OperationStats,
}

/// Thread-safe counters shared by every clone of a client.
#[derive(Debug, Default)]
pub struct RenderMetrics {
    convert_html: OperationCounters,
    merge_pdfs: OperationCounters,
    health: OperationCounters,
}

impl RenderMetrics {
    fn counters(&self, operation: RenderOperation) -> &OperationCounters {
        match operation {
            RenderOperation::ConvertHtml => &self.convert_html,
            RenderOperation::MergePdfs => &self.merge_pdfs,
            RenderOperation::Health => &self.health,
        }
    }

    pub(crate) fn record_attempt(&self, operation: RenderOperation) {
        self.counters(operation).attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timeout(&self, operation: RenderOperation) {
        let counters = self.counters(operation);
        counters.timeouts.fetch_add(1, Ordering::Relaxed);
        counters.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self, operation: RenderOperation) {
        self.counters(operation).errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            convert_html: self.convert_html.snapshot(),
            merge_pdfs: self.merge_pdfs.snapshot(),
            health: self.health.snapshot(),
        }
    }
}
