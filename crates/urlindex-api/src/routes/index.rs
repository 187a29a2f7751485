use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;
use urlindex::{BatchReport, NotificationType};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    validation,
};

/// Body accepted by both index endpoints
///
/// `urls` stays untyped so a wrong shape maps to the validation message
/// rather than a deserialization error.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct IndexRequest {
    #[schema(value_type = Option<Vec<String>>)]
    #[serde(default)]
    pub urls: Option<Value>,

    /// `URL_UPDATED` (default) or `URL_DELETED`
    #[schema(value_type = Option<String>)]
    #[serde(default, rename = "type")]
    pub notification_type: Option<NotificationType>,
}

impl IndexRequest {
    /// Unwrap the extractor result and validate the URL list
    pub fn parse(
        payload: Result<Json<IndexRequest>, JsonRejection>,
    ) -> ApiResult<(Vec<String>, Option<NotificationType>)> {
        let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let urls = validation::validate_urls(req.urls.as_ref())?;
        Ok((urls, req.notification_type))
    }
}

/// Submit a batch and wait for every outcome
#[utoipa::path(
    post,
    path = "/api/index",
    request_body = IndexRequest,
    responses(
        (status = 200, description = "Every URL processed", body = BatchReport),
        (status = 400, description = "No usable URLs in the request", body = ErrorResponse),
        (status = 500, description = "Batch failed", body = ErrorResponse)
    ),
    tag = "indexing"
)]
pub async fn index_urls(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IndexRequest>, JsonRejection>,
) -> ApiResult<Json<BatchReport>> {
    let (urls, notification_type) = IndexRequest::parse(payload)?;

    tracing::info!(count = urls.len(), "Received batch indexing request");

    let report = state.processor_for(notification_type).run(urls).await?;

    Ok(Json(report))
}

/// Error body shared by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
