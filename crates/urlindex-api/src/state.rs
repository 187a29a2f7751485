use std::sync::Arc;
use urlindex::{BatchConfig, BatchProcessor, IndexingClient, NotificationType, ServiceAccountAuth};
use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Credentials, client and processor are created once at startup and shared
/// across requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<ServiceAccountAuth>,
    pub client: Arc<dyn IndexingClient>,
    pub processor: Arc<BatchProcessor>,
}

impl AppState {
    pub fn new(
        config: Config,
        auth: Arc<ServiceAccountAuth>,
        client: Arc<dyn IndexingClient>,
        processor: BatchProcessor,
    ) -> Self {
        Self {
            config: Arc::new(config),
            auth,
            client,
            processor: Arc::new(processor),
        }
    }

    /// Processor for one request, honoring a per-request notification type
    pub fn processor_for(&self, notification_type: Option<NotificationType>) -> BatchProcessor {
        let config: BatchConfig = match notification_type {
            Some(t) => self.processor.config().clone().with_notification_type(t),
            None => self.processor.config().clone(),
        };
        self.processor.with_config(config)
    }
}
