use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use urlindex_api::{app::build_router, config::Config, state::AppState};
use urlindex::{BatchProcessor, GoogleIndexingClient, IndexingClient, ServiceAccountAuth};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting urlindex API server");
    tracing::info!("Config loaded: {}", config.server_address());

    // Credentials are read once here; the server still starts without them
    tracing::info!(
        path = %config.indexing.credentials_path,
        "Loading service account credentials"
    );
    let request_timeout = Duration::from_secs(config.indexing.request_timeout_secs);
    let auth = Arc::new(
        ServiceAccountAuth::from_path(&config.indexing.credentials_path)
            .with_timeout(request_timeout),
    );
    let setup = auth.check_setup().await;
    if let Some(error) = &setup.error {
        tracing::warn!("Service account setup incomplete: {}", error);
        tracing::warn!("Indexing requests will fail until the credentials are fixed");
    }

    // Initialize Indexing API client
    let client: Arc<dyn IndexingClient> = Arc::new(
        GoogleIndexingClient::builder()
            .auth(auth.clone())
            .base_url(config.indexing.base_url.clone())
            .timeout(request_timeout)
            .build()?,
    );

    let processor = BatchProcessor::builder()
        .client(Arc::clone(&client))
        .config(config.indexing.batch_config())
        .build()?;

    // Create application state
    let state = Arc::new(AppState::new(config.clone(), auth, client, processor));

    // Build router
    let app = build_router(state);

    // Start server
    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
