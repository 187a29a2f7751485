//! Prelude module for convenient imports
//!
//! Import everything you need with:
//! ```rust
//! use urlindex::prelude::*;
//! ```

pub use crate::{
    BatchConfig, BatchEvent, BatchReport, BatchSummary, NotificationType, SubmissionOutcome,
    AccessTokenProvider, IndexingClient, GoogleIndexingClient, ServiceAccountAuth, StaticToken,
    IndexingError,
    BatchProcessor, BatchError,
};
