use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use urlindex::{capture_outcome, SubmissionOutcome};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    validation,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    /// Absolute URL to look up
    pub url: String,
}

/// Latest notification metadata the Indexing API holds for one URL
///
/// A remote failure is reported in the body, not as an HTTP error.
#[utoipa::path(
    get,
    path = "/api/status",
    params(StatusQuery),
    responses(
        (status = 200, description = "Lookup outcome", body = SubmissionOutcome),
        (status = 400, description = "Missing or invalid url",
            body = crate::routes::index::ErrorResponse)
    ),
    tag = "indexing"
)]
pub async fn url_status(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> ApiResult<Json<SubmissionOutcome>> {
    let Query(StatusQuery { url }) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if !validation::is_absolute_url(&url) {
        return Err(ApiError::Validation("Invalid URL provided".to_string()));
    }

    let outcome = capture_outcome(&url, state.client.get_metadata(&url)).await;

    Ok(Json(outcome))
}
