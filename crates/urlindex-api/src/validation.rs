use serde_json::Value;
use crate::error::ApiError;

pub const NO_URLS: &str = "No URLs provided";
pub const NO_VALID_URLS: &str = "No valid URLs provided";

/// Turn the raw `urls` field into the list handed to the processor.
///
/// Anything that is not a non-empty array is rejected outright. Elements
/// that are not strings holding an absolute URL are dropped; if nothing
/// survives the request is rejected too.
pub fn validate_urls(urls: Option<&Value>) -> Result<Vec<String>, ApiError> {
    let items = match urls {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(ApiError::Validation(NO_URLS.to_string())),
    };

    let valid: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .filter(|candidate| is_absolute_url(candidate))
        .map(str::to_string)
        .collect();

    if valid.is_empty() {
        return Err(ApiError::Validation(NO_VALID_URLS.to_string()));
    }

    if valid.len() < items.len() {
        tracing::warn!(
            dropped = items.len() - valid.len(),
            kept = valid.len(),
            "Dropped invalid URLs from request"
        );
    }

    Ok(valid)
}

pub fn is_absolute_url(candidate: &str) -> bool {
    url::Url::parse(candidate).is_ok()
}
