use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of submitting a single URL to the indexing API.
///
/// Exactly one of `response` / `error` is populated, depending on `success`.
/// Failures are data: every submitted URL yields one outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub url: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionOutcome {
    pub fn succeeded(url: impl Into<String>, response: Value) -> Self {
        Self {
            url: url.into(),
            success: true,
            response: Some(response),
            error: None,
        }
    }

    /// An empty message is replaced with "Unknown error" so failed outcomes
    /// always carry a readable reason.
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        let error = if error.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            error
        };

        Self {
            url: url.into(),
            success: false,
            response: None,
            error: Some(error),
        }
    }
}

/// Aggregate counts for a processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[SubmissionOutcome]) -> Self {
        let successful = outcomes.iter().filter(|o| o.success).count();
        Self {
            total: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
        }
    }
}

/// Running tally kept by the processor while outcomes are produced.
#[derive(Debug, Clone, Default)]
pub struct BatchTally {
    successful: usize,
    failed: usize,
}

impl BatchTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &SubmissionOutcome) {
        if outcome.success {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn processed(&self) -> usize {
        self.successful + self.failed
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total: self.processed(),
            successful: self.successful,
            failed: self.failed,
        }
    }
}

/// Fully materialized batch: every outcome plus the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<SubmissionOutcome>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn new(results: Vec<SubmissionOutcome>) -> Self {
        let summary = BatchSummary::from_outcomes(&results);
        Self { results, summary }
    }
}
