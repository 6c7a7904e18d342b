//! Axum server setup

use crate::{api, state::AppState};
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use vfolder::{FileService, NamespaceTranslator, ServiceConfig};

/// Build the router over an already constructed service
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(api::health))
        // Browse
        .route("/list", get(api::list_root))
        .route("/list/folder", get(api::list_folder_by_query))
        .route("/list/:folder_id", get(api::list_folder))
        .route("/resource", get(api::get_resource_by_query))
        .route("/resource/:id", get(api::get_resource))
        // Transfer
        .route("/download", get(api::download_by_query))
        .route("/download/:id", get(api::download))
        .route("/upload", post(api::upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the configured store and serve until Ctrl-C
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    tracing::info!("Starting vfolder server v{}", vfolder::VERSION);
    tracing::info!("Store: {}", config.store.backend_type());

    let store = config
        .store
        .open()
        .await
        .context("Failed to open object store")?;

    let mut translator = NamespaceTranslator::new(store);
    if let Some(dir) = &config.download.temp_dir {
        tracing::info!("Download staging directory: {}", dir.display());
        translator = translator.with_temp_dir(dir.clone());
    }

    let state = AppState::new(FileService::new(translator));
    let app = build_router(state, config.server.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
