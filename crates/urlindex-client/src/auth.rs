//! Service-account authentication for the indexing API.
//!
//! The key file is parsed once and the OAuth access token is cached until
//! shortly before it expires, so concurrent batches share one credential.

use crate::error::{IndexingError, Result};
use crate::traits::AccessTokenProvider;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;
use tokio::sync::{OnceCell, RwLock};

pub const INDEXING_SCOPE: &str = "https://www.googleapis.com/auth/indexing";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Upper bound on one token exchange; the cache lock is held for its duration
pub const DEFAULT_TOKEN_TIMEOUT: StdDuration = StdDuration::from_secs(30);

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Service account key file (`service_account.json`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    pub client_id: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub auth_provider_x509_cert_url: String,
    pub client_x509_cert_url: String,
}

impl ServiceAccountKey {
    /// Read and parse a key file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match tokio::fs::try_exists(path).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(IndexingError::Credentials(format!(
                    "Service account file not found at {}. Please place your service_account.json file in the project root.",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(IndexingError::Credentials(format!(
                    "Failed to read or parse service account file: {}",
                    e
                )));
            }
        }

        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            IndexingError::Credentials(format!(
                "Failed to read or parse service account file: {}",
                e
            ))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            IndexingError::Credentials(format!(
                "Failed to read or parse service account file: {}",
                e
            ))
        })
    }

    pub fn has_required_fields(&self) -> bool {
        !self.client_email.trim().is_empty() && !self.private_key.trim().is_empty()
    }

    fn token_uri(&self) -> &str {
        if self.token_uri.is_empty() {
            DEFAULT_TOKEN_URI
        } else {
            &self.token_uri
        }
    }
}

/// OAuth2 access token with expiration
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Expired, or within five minutes of expiring
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at - Duration::minutes(5)
    }
}

/// Outcome of validating the configured credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatus {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SetupStatus {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

/// Access tokens minted from a service-account key.
///
/// Built once at startup and shared by reference. When created from a path
/// the file is read on first use; a failed load is not cached, so fixing
/// the file on disk takes effect without a restart.
#[derive(Debug)]
pub struct ServiceAccountAuth {
    credentials_path: Option<PathBuf>,
    key: OnceCell<ServiceAccountKey>,
    token_cache: RwLock<Option<AccessToken>>,
    http_client: reqwest::Client,
    scope: String,
    timeout: StdDuration,
}

impl ServiceAccountAuth {
    /// Lazily load the key from `path` on first use
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: Some(path.into()),
            key: OnceCell::new(),
            token_cache: RwLock::new(None),
            http_client: reqwest::Client::new(),
            scope: INDEXING_SCOPE.to_string(),
            timeout: DEFAULT_TOKEN_TIMEOUT,
        }
    }

    /// Use an already parsed key
    pub fn from_key(key: ServiceAccountKey) -> Self {
        Self {
            credentials_path: None,
            key: OnceCell::new_with(Some(key)),
            token_cache: RwLock::new(None),
            http_client: reqwest::Client::new(),
            scope: INDEXING_SCOPE.to_string(),
            timeout: DEFAULT_TOKEN_TIMEOUT,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Timeout for the token endpoint request
    pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn credentials_path(&self) -> Option<&Path> {
        self.credentials_path.as_deref()
    }

    /// Parsed key, loading it from disk if this is the first call
    pub async fn key(&self) -> Result<&ServiceAccountKey> {
        self.key
            .get_or_try_init(|| async {
                let path = self.credentials_path.as_ref().ok_or_else(|| {
                    IndexingError::Credentials("No service account credentials configured".into())
                })?;
                let key = ServiceAccountKey::from_file(path).await?;
                tracing::info!(
                    client_email = %key.client_email,
                    "Loaded service account credentials"
                );
                Ok::<_, IndexingError>(key)
            })
            .await
    }

    /// Check the credentials are present and carry the fields needed to sign
    pub async fn check_setup(&self) -> SetupStatus {
        match self.key().await {
            Ok(key) if key.has_required_fields() => SetupStatus::valid(),
            Ok(_) => SetupStatus::invalid(
                "Service account credentials are missing required fields (client_email, private_key)",
            ),
            Err(e) => SetupStatus::invalid(e.describe()),
        }
    }

    async fn fetch_token(&self, key: &ServiceAccountKey) -> Result<AccessToken> {
        use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

        if !key.has_required_fields() {
            return Err(IndexingError::Credentials(
                "Service account credentials are missing required fields (client_email, private_key)"
                    .into(),
            ));
        }

        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: &self.scope,
            aud: key.token_uri(),
            exp: now + 3600,
            iat: now,
        };

        let mut header = Header::new(Algorithm::RS256);
        if !key.private_key_id.is_empty() {
            header.kid = Some(key.private_key_id.clone());
        }

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| IndexingError::Auth(format!("Invalid private key: {}", e)))?;
        let assertion = encode(&header, &claims, &encoding_key)
            .map_err(|e| IndexingError::Auth(format!("Failed to sign token request: {}", e)))?;

        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .http_client
            .post(key.token_uri())
            .timeout(self.timeout)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let reason = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {}", e.error, description),
                    None => e.error,
                })
                .unwrap_or_else(|_| format!("token endpoint returned {}", status));
            return Err(IndexingError::Auth(reason));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| IndexingError::InvalidResponse(format!("token response: {}", e)))?;

        Ok(AccessToken {
            token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cache = self.token_cache.write().await;

        // Another task may have refreshed while we waited for the lock
        if let Some(ref token) = *cache {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let key = self.key().await?;
        let token = self.fetch_token(key).await?;
        tracing::debug!(expires_at = %token.expires_at, "Obtained indexing API access token");

        let value = token.token.clone();
        *cache = Some(token);
        Ok(value)
    }
}

/// Fixed bearer token, for pre-issued tokens and tests
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
