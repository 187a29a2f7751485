use std::sync::Arc;
use std::time::Duration;

use urlindex_client::IndexingClient;
use urlindex_types::{BatchConfig, NotificationType};

use crate::error::{BatchError, Result};
use crate::processor::BatchProcessor;

/// Builder for constructing a BatchProcessor
pub struct BatchProcessorBuilder {
    client: Option<Arc<dyn IndexingClient>>,
    config: BatchConfig,
}

impl BatchProcessorBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            config: BatchConfig::default(),
        }
    }

    /// Set the indexing client
    pub fn client(mut self, client: Arc<dyn IndexingClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn item_delay(mut self, delay: Duration) -> Self {
        self.config.item_delay = delay;
        self
    }

    pub fn notification_type(mut self, notification_type: NotificationType) -> Self {
        self.config.notification_type = notification_type;
        self
    }

    pub fn build(self) -> Result<BatchProcessor> {
        let client = self.client.ok_or(BatchError::MissingClient)?;
        Ok(BatchProcessor::new(client, self.config))
    }
}

impl Default for BatchProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
