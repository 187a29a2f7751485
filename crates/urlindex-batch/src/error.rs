use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// The event channel closed before a summary was produced
    #[error("Batch stream ended before completion")]
    Interrupted,

    #[error("Batch pipeline failed: {0}")]
    Pipeline(String),

    /// The consumer stopped listening
    #[error("Batch consumer disconnected")]
    Disconnected,

    #[error("Indexing client is required")]
    MissingClient,
}

pub type Result<T> = std::result::Result<T, BatchError>;
