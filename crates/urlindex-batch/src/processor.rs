use crate::error::{BatchError, Result};
use futures::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;
use urlindex_client::{IndexingClient, IndexingError};
use urlindex_types::{BatchConfig, BatchEvent, BatchReport, BatchTally, SubmissionOutcome};

/// Error recorded when a submission panics instead of returning
pub const UNEXPECTED_ERROR: &str = "Unexpected error occurred";

/// Run one remote call and turn whatever happens into an outcome.
///
/// Remote failures become `success: false` with the classified message.
/// A panic inside the call is contained here and reported as
/// [`UNEXPECTED_ERROR`], so one bad item never takes the batch down.
pub async fn capture_outcome<F>(url: &str, call: F) -> SubmissionOutcome
where
    F: Future<Output = std::result::Result<Value, IndexingError>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(response)) => SubmissionOutcome::succeeded(url, response),
        Ok(Err(e)) => {
            tracing::error!(url = %url, error = %e, "Indexing call failed");
            SubmissionOutcome::failed(url, e.describe())
        }
        Err(_) => {
            tracing::error!(url = %url, "Unexpected error processing URL");
            SubmissionOutcome::failed(url, UNEXPECTED_ERROR)
        }
    }
}

/// Sequential batch submitter.
///
/// One URL at a time, with a pause between submissions to stay under the
/// remote rate limit. Outcomes are pushed to the consumer as soon as they
/// exist rather than buffered until the end.
pub struct BatchProcessor {
    client: Arc<dyn IndexingClient>,
    config: BatchConfig,
}

impl BatchProcessor {
    pub fn new(client: Arc<dyn IndexingClient>, config: BatchConfig) -> Self {
        Self { client, config }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> crate::builder::BatchProcessorBuilder {
        crate::builder::BatchProcessorBuilder::new()
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<dyn IndexingClient> {
        &self.client
    }

    /// Same processor with different settings, sharing the client
    pub fn with_config(&self, config: BatchConfig) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config,
        }
    }

    /// Spawn the batch in the background, return the event receiver.
    ///
    /// Emits `Started`, one `Outcome` per URL in input order, then `Summary`.
    /// If the receiver is dropped and `stop_on_disconnect` is set, no further
    /// remote calls are made. If the worker dies outside the per-item
    /// boundary, an `Error` event is sent instead of the summary.
    pub fn spawn_run(&self, urls: Vec<String>) -> mpsc::Receiver<BatchEvent> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));

        let client = Arc::clone(&self.client);
        let config = self.config.clone();
        let batch_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("batch", batch_id = %batch_id, total = urls.len());

        let worker = tokio::spawn(
            Self::execute_loop(batch_id, urls, tx.clone(), client, config)
                .instrument(span.clone()),
        );
        tokio::spawn(supervise(worker, tx).instrument(span));

        rx
    }

    /// Run the batch to completion and materialize every outcome.
    ///
    /// Dropping the returned future drops the receiver, which stops the
    /// background task before its next remote call.
    pub async fn run(&self, urls: Vec<String>) -> Result<BatchReport> {
        let mut events = self.spawn_run(urls);
        let mut results = Vec::new();

        while let Some(event) = events.recv().await {
            match event {
                BatchEvent::Started { .. } => {}
                BatchEvent::Outcome(outcome) => results.push(outcome),
                BatchEvent::Summary(summary) => {
                    return Ok(BatchReport { results, summary });
                }
                BatchEvent::Error { message } => return Err(BatchError::Pipeline(message)),
            }
        }

        Err(BatchError::Interrupted)
    }

    async fn execute_loop(
        batch_id: String,
        urls: Vec<String>,
        event_tx: mpsc::Sender<BatchEvent>,
        client: Arc<dyn IndexingClient>,
        config: BatchConfig,
    ) -> Result<()> {
        let total = urls.len();
        tracing::info!("Processing {} URLs for indexing", total);

        if event_tx
            .send(BatchEvent::Started { batch_id, total })
            .await
            .is_err()
            && config.stop_on_disconnect
        {
            return Err(BatchError::Disconnected);
        }

        let mut tally = BatchTally::new();

        for (index, url) in urls.iter().enumerate() {
            if config.stop_on_disconnect && event_tx.is_closed() {
                tracing::warn!(
                    processed = index,
                    skipped = total - index,
                    "Consumer went away, skipping remaining URLs"
                );
                return Err(BatchError::Disconnected);
            }

            tracing::info!(url = %url, position = index + 1, "Processing URL");

            let outcome = capture_outcome(
                url,
                client.publish(url, config.notification_type),
            )
            .await;

            if outcome.success {
                tracing::info!(url = %url, "Successfully submitted");
            } else {
                tracing::warn!(
                    url = %url,
                    error = outcome.error.as_deref().unwrap_or_default(),
                    "Failed to submit"
                );
            }

            tally.record(&outcome);

            if event_tx.send(BatchEvent::Outcome(outcome)).await.is_err()
                && config.stop_on_disconnect
            {
                return Err(BatchError::Disconnected);
            }

            if index + 1 < total && !config.item_delay.is_zero() {
                tokio::time::sleep(config.item_delay).await;
            }
        }

        let summary = tally.summary();
        tracing::info!(
            successful = summary.successful,
            failed = summary.failed,
            total = summary.total,
            "Batch finished"
        );

        // Only fails if the consumer is gone, and then nobody is left to tell
        let _ = event_tx.send(BatchEvent::Summary(summary)).await;

        Ok(())
    }
}

/// Wait for the batch worker and report a crash to the consumer
async fn supervise(worker: JoinHandle<Result<()>>, event_tx: mpsc::Sender<BatchEvent>) {
    match worker.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::info!(reason = %e, "Batch stopped early");
        }
        Err(e) => {
            let error = BatchError::Pipeline(e.to_string());
            tracing::error!(error = %error, "Batch failed");
            let _ = event_tx
                .send(BatchEvent::Error {
                    message: error.to_string(),
                })
                .await;
        }
    }
}
