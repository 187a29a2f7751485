use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use urlindex_types::NotificationType;

/// Remote indexing operations for a single URL.
///
/// Implementations report remote rejections as `Err`; the batch processor
/// turns them into failed outcomes.
#[async_trait]
pub trait IndexingClient: Send + Sync {
    /// Notify the indexing service that `url` changed (or was removed)
    async fn publish(&self, url: &str, notification_type: NotificationType) -> Result<Value>;

    /// Fetch the latest notification metadata recorded for `url`
    async fn get_metadata(&self, url: &str) -> Result<Value>;
}

/// Source of bearer tokens for the indexing API
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}
