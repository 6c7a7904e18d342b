//! API handlers

pub mod files;

pub use files::{
    download, download_by_query, get_resource, get_resource_by_query, list_folder,
    list_folder_by_query, list_root, upload,
};

use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: &'static str,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: vfolder::VERSION,
        backend: state.service.backend_name(),
    })
}
