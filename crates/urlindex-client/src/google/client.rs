// Google Indexing API client

use crate::error::{IndexingError, Result};
use crate::google::types::{PublishRequest, PublishResponse};
use crate::traits::{AccessTokenProvider, IndexingClient};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use urlindex_types::NotificationType;

pub const GOOGLE_INDEXING_API_BASE: &str = "https://indexing.googleapis.com";

/// Indexing API client (HTTP direct, no SDK)
///
/// Every call asks the token provider for a bearer token, so a cached
/// service-account token is shared across calls and batches.
pub struct GoogleIndexingClient {
    http_client: reqwest::Client,
    base_url: String,
    auth: Arc<dyn AccessTokenProvider>,
}

impl GoogleIndexingClient {
    /// Client against the public endpoint with default settings
    pub fn new(auth: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        Self::builder().auth(auth).build()
    }

    pub fn builder() -> GoogleIndexingClientBuilder {
        GoogleIndexingClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn handle_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexingError::from_response(status, &body));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        serde_json::from_str(&body).map_err(|e| IndexingError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl IndexingClient for GoogleIndexingClient {
    async fn publish(&self, url: &str, notification_type: NotificationType) -> Result<Value> {
        let token = self.auth.access_token().await?;

        let body = PublishRequest {
            url: url.to_string(),
            notification_type,
        };

        let response = self
            .http_client
            .post(format!("{}/v3/urlNotifications:publish", self.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let value = Self::handle_response(response).await?;

        if let Ok(parsed) = serde_json::from_value::<PublishResponse>(value.clone()) {
            if let Some(update) = parsed
                .url_notification_metadata
                .and_then(|m| m.latest_update)
            {
                tracing::debug!(
                    url = %update.url,
                    notify_time = %update.notify_time,
                    "Indexing API acknowledged notification"
                );
            }
        }

        Ok(value)
    }

    async fn get_metadata(&self, url: &str) -> Result<Value> {
        let token = self.auth.access_token().await?;

        let response = self
            .http_client
            .get(format!("{}/v3/urlNotifications/metadata", self.base_url))
            .bearer_auth(token)
            .query(&[("url", url)])
            .send()
            .await?;

        Self::handle_response(response).await
    }
}

/// Builder for GoogleIndexingClient
#[derive(Default)]
pub struct GoogleIndexingClientBuilder {
    auth: Option<Arc<dyn AccessTokenProvider>>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl GoogleIndexingClientBuilder {
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Override the API base URL, e.g. for a local mock
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<GoogleIndexingClient> {
        let auth = self
            .auth
            .ok_or_else(|| IndexingError::Other("Access token provider is required".into()))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| GOOGLE_INDEXING_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(GoogleIndexingClient {
            http_client,
            base_url,
            auth,
        })
    }
}
