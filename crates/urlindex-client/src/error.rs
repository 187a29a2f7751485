use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexingError {
    /// The API answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Credentials(String),

    #[error("Invalid response from indexing API: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

impl IndexingError {
    /// Build an API error from a status code and the raw response body.
    ///
    /// Google error bodies look like `{"error": {"code": 403, "message": "..."}}`.
    /// Falls back to the status reason phrase, then to "API Error".
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let nested = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .filter(|message| !message.trim().is_empty());

        let message = nested
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "API Error".to_string());

        Self::Api {
            status: status.as_u16(),
            message,
        }
    }

    /// Human-readable reason used in failed submission outcomes
    pub fn describe(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexingError>;
