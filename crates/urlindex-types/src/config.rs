use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Notification kind sent to the indexing API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    #[default]
    UrlUpdated,
    UrlDeleted,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UrlUpdated => "URL_UPDATED",
            Self::UrlDeleted => "URL_DELETED",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Pause between consecutive submissions
    pub item_delay: Duration,
    /// Capacity of the processor -> consumer event channel
    pub channel_capacity: usize,
    /// Stop issuing remote calls once the consumer has gone away
    pub stop_on_disconnect: bool,
    pub notification_type: NotificationType,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            item_delay: Duration::from_millis(100),
            channel_capacity: 100,
            stop_on_disconnect: true,
            notification_type: NotificationType::default(),
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        // mpsc::channel panics on zero capacity
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_stop_on_disconnect(mut self, enabled: bool) -> Self {
        self.stop_on_disconnect = enabled;
        self
    }

    pub fn with_notification_type(mut self, notification_type: NotificationType) -> Self {
        self.notification_type = notification_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BatchConfig::default();
        assert_eq!(config.item_delay, Duration::from_millis(100));
        assert!(config.stop_on_disconnect);
        assert_eq!(config.notification_type, NotificationType::UrlUpdated);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let config = BatchConfig::new().with_channel_capacity(0);
        assert_eq!(config.channel_capacity, 1);
    }

    #[test]
    fn test_notification_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&NotificationType::UrlDeleted).unwrap(),
            "\"URL_DELETED\""
        );
        let parsed: NotificationType = serde_json::from_str("\"URL_UPDATED\"").unwrap();
        assert_eq!(parsed, NotificationType::UrlUpdated);
        assert_eq!(NotificationType::UrlDeleted.to_string(), "URL_DELETED");
    }
}
