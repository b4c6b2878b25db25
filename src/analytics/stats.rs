use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Submission counters shared between concurrent callers.
#[derive(Debug, Default)]
pub struct Stats {
    pub submitted_documents: AtomicU64,
    pub failed_documents: AtomicU64,
    pub interrupted_waits: AtomicU64,

    // Time spent waiting for admission plus the call itself, last observed value
    pub last_submit_latency_ms: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_submitted(&self) {
        self.submitted_documents.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed(&self) {
        self.failed_documents.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_interrupted(&self) {
        self.interrupted_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_submit_latency(&self, ms: u64) {
        self.last_submit_latency_ms.store(ms, Ordering::Relaxed);
    }

    pub fn submitted(&self) -> u64 {
        self.submitted_documents.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed_documents.load(Ordering::Relaxed)
    }

    pub fn interrupted(&self) -> u64 {
        self.interrupted_waits.load(Ordering::Relaxed)
    }

    pub fn log_stats(&self) {
        info!(
            "STATS: Documents: {} Submitted, {} Failed, {} Interrupted | Last latency {}ms",
            self.submitted(),
            self.failed(),
            self.interrupted(),
            self.last_submit_latency_ms.load(Ordering::Relaxed)
        );
    }
}
