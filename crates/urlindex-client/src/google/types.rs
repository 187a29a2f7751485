// Wire types for the Google Indexing API v3

use serde::{Deserialize, Serialize};
use urlindex_types::NotificationType;

/// Body of `urlNotifications:publish`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    pub url: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
}

/// Body returned by `urlNotifications:publish`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_notification_metadata: Option<UrlNotificationMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlNotificationMetadata {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_update: Option<UrlNotification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_remove: Option<UrlNotification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlNotification {
    pub url: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub notify_time: String,
}
