use anyhow::{Context, Result};
use mlm_cms::api::{create_router, AppState};
use mlm_cms::config::Config;
use mlm_cms::store::{ContentStore, MemoryContentStore, PgContentStore};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mlm_cms=info".parse()?),
        )
        .init();

    info!("Starting content service");

    // Load configuration from environment
    let config = Config::from_env()?;

    let store: Arc<dyn ContentStore> = match config.database_url.as_deref() {
        Some(url) => {
            info!("Connecting to PostgreSQL");
            Arc::new(PgContentStore::connect(url).await?)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
            Arc::new(MemoryContentStore::new())
        }
    };

    if config.admin_session_token.is_none() {
        warn!("ADMIN_SESSION_TOKEN not set, admin endpoints will reject every request");
    }

    let port = config.port;
    let state = AppState::new(config, store)?;
    info!(
        "Default locale: {} ({} locales enabled)",
        state.locales.default_locale().code,
        state.locales.list_enabled().len()
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("✓ Listening on port {}", port);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
