use serde::{Deserialize, Serialize};

use crate::outcome::{BatchSummary, SubmissionOutcome};

/// Events produced by the batch processor, in emission order:
/// `Started`, one `Outcome` per URL, then `Summary`.
///
/// `Error` replaces the remaining events when the pipeline fails outside
/// the per-item boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    /// Batch accepted, nothing submitted yet
    Started {
        batch_id: String,
        total: usize,
    },

    /// One URL processed
    Outcome(SubmissionOutcome),

    /// All URLs processed
    Summary(BatchSummary),

    /// Fatal pipeline error
    Error {
        message: String,
    },
}

impl BatchEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Summary(_) | Self::Error { .. })
    }
}
