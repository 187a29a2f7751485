//! # urlindex
//!
//! Submit batches of URLs to the Google Indexing API one at a time and
//! observe each outcome as soon as it exists.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use urlindex::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Credentials are read from disk on first use
//!     let auth = Arc::new(ServiceAccountAuth::from_path("service_account.json"));
//!
//!     let client: Arc<dyn IndexingClient> = Arc::new(
//!         GoogleIndexingClient::builder().auth(auth).build()?
//!     );
//!
//!     let processor = BatchProcessor::builder()
//!         .client(client)
//!         .config(BatchConfig::new())
//!         .build()?;
//!
//!     let mut events = processor.spawn_run(vec![
//!         "https://example.com/".to_string(),
//!         "https://example.com/about".to_string(),
//!     ]);
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             BatchEvent::Outcome(outcome) => println!("{}: {}", outcome.url, outcome.success),
//!             BatchEvent::Summary(summary) => {
//!                 println!("{} of {} submitted", summary.successful, summary.total)
//!             }
//!             _ => {}
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`urlindex-types`**: outcomes, summaries, batch events and settings
//! - **`urlindex-client`**: Indexing API client and service-account auth
//! - **`urlindex-batch`**: the sequential batch processor
//! - **`urlindex-api`**: HTTP server with JSON and SSE endpoints
//!
//! ## License
//!
//! MIT

pub mod prelude;

pub use urlindex_types::{
    BatchConfig, BatchEvent, BatchReport, BatchSummary, BatchTally, NotificationType,
    SubmissionOutcome,
};

pub use urlindex_client::{
    AccessTokenProvider, IndexingClient,
    GoogleIndexingClient, GoogleIndexingClientBuilder, GOOGLE_INDEXING_API_BASE,
    ServiceAccountAuth, ServiceAccountKey, SetupStatus, StaticToken,
    IndexingError,
};

pub use urlindex_batch::{
    BatchProcessor, BatchProcessorBuilder, BatchError, capture_outcome, UNEXPECTED_ERROR,
};
