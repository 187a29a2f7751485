pub mod builder;
pub mod error;
pub mod processor;

pub use builder::BatchProcessorBuilder;
pub use error::BatchError;
pub use processor::{capture_outcome, BatchProcessor, UNEXPECTED_ERROR};

// Re-export key types from urlindex-types
pub use urlindex_types::{
    BatchConfig, BatchEvent, BatchReport, BatchSummary, BatchTally, NotificationType,
    SubmissionOutcome,
};
