use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::Config,
    handlers::stream,
    middleware::logging,
    routes::{health, index, setup, status},
    state::AppState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        index::index_urls,
        stream::index_urls_stream,
        status::url_status,
        setup::setup_check,
    ),
    components(schemas(index::IndexRequest, index::ErrorResponse, health::HealthResponse)),
    tags(
        (name = "indexing", description = "Batch URL submission"),
        (name = "setup", description = "Credential checks"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    // Batches run as long as their URL count requires, so only the
    // short-lived routes get a request timeout
    let batch_routes = Router::new()
        .route("/api/index", post(index::index_urls))
        .route("/api/index/stream", post(stream::index_urls_stream));

    let service_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Indexing
        .route("/api/status", get(status::url_status))
        // Setup
        .route("/api/setup", get(setup::setup_check))
        // Docs
        .route("/api/openapi.json", get(openapi_json))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.server.request_timeout_secs,
        )));

    // SSE responses are skipped by the compression layer's default predicate
    Router::new()
        .merge(batch_routes)
        .merge(service_routes)
        .layer(middleware::from_fn(logging::log_request))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}
