use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::analytics::stats::Stats;
use crate::config::Config;
use crate::document::Document;
use crate::error::{AppError, Result};
use crate::gate::{GateError, RateGate};
use crate::http::{DocumentSink, HttpDocumentSink};
use crate::utils::time::{elapsed_ms, now_instant};

/// Client for the "create document" API that never exceeds the configured request rate.
///
/// Callers over the limit are delayed, not rejected. Clones share the gate,
/// the sink and the counters, so one instance can be handed to many tasks.
#[derive(Clone)]
pub struct CrptApi {
    gate: RateGate,
    sink: Arc<dyn DocumentSink>,
    stats: Arc<Stats>,
}

impl CrptApi {
    pub fn new(gate: RateGate, sink: Arc<dyn DocumentSink>) -> Self {
        Self {
            gate,
            sink,
            stats: Arc::new(Stats::new()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let gate = RateGate::per_time_unit(config.time_unit, config.request_limit)?;
        let sink = HttpDocumentSink::new(config.endpoint.clone(), &config.http)?;

        info!(
            "Throttling {} to {} requests per {:?}",
            sink.endpoint(),
            gate.capacity(),
            gate.period()
        );

        Ok(Self::new(gate, Arc::new(sink)))
    }

    pub fn gate(&self) -> &RateGate {
        &self.gate
    }

    pub fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }

    /// Submits a signed document, waiting for the rate limit if necessary.
    pub async fn create_document(&self, document: &Document, signature: &str) -> Result<()> {
        let start = now_instant();

        let result = self
            .gate
            .run_guarded(|| self.sink.submit(document, signature))
            .await;

        self.record(document, start, &result);
        result
    }

    /// Same as [`CrptApi::create_document`], but stops waiting for admission once `token` is cancelled.
    pub async fn create_document_with_cancel(
        &self,
        token: &CancellationToken,
        document: &Document,
        signature: &str,
    ) -> Result<()> {
        let start = now_instant();

        let result = self
            .gate
            .run_guarded_with_cancel(token, || self.sink.submit(document, signature))
            .await;

        self.record(document, start, &result);
        result
    }

    fn record(&self, document: &Document, start: std::time::Instant, result: &Result<()>) {
        self.stats.update_submit_latency(elapsed_ms(start));

        let doc_id = document.doc_id.as_deref().unwrap_or("-");
        match result {
            Ok(()) => {
                self.stats.inc_submitted();
                info!("Document {} submitted", doc_id);
            }
            Err(AppError::Gate(GateError::Interrupted)) => {
                self.stats.inc_interrupted();
                warn!("Document {} not submitted: wait interrupted", doc_id);
            }
            Err(e) => {
                self.stats.inc_failed();
                warn!("Document {} failed: {}", doc_id, e);
            }
        }
    }
}
