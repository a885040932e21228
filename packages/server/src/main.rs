use std::sync::Arc;

use anyhow::Context;
use common::storage::FilesystemUploadStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use labeler_server::config::AppConfig;
use labeler_server::database::init_db;
use labeler_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to initialize database")?;

    let uploads = FilesystemUploadStore::new(
        config.storage.uploads_dir.clone(),
        config.storage.max_upload_size,
    )
    .await
    .context("Failed to initialize upload store")?;
    info!(dir = %config.storage.uploads_dir.display(), "Upload store ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        uploads: Arc::new(uploads),
        config,
    };
    let app = labeler_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
