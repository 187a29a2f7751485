use axum::{extract::State, Json};
use std::sync::Arc;
use urlindex::SetupStatus;

use crate::state::AppState;

/// Check the service account credentials can be loaded and used
#[utoipa::path(
    get,
    path = "/api/setup",
    responses(
        (status = 200, description = "Credential check result", body = SetupStatus)
    ),
    tag = "setup"
)]
pub async fn setup_check(State(state): State<Arc<AppState>>) -> Json<SetupStatus> {
    let status = state.auth.check_setup().await;

    if let Some(error) = &status.error {
        tracing::warn!(error = %error, "Service account setup is incomplete");
    }

    Json(status)
}
