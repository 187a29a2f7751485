pub mod config;
pub mod events;
pub mod outcome;

pub use config::{BatchConfig, NotificationType};
pub use events::BatchEvent;
pub use outcome::{BatchReport, BatchSummary, BatchTally, SubmissionOutcome};
