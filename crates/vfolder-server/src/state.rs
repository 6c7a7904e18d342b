//! Shared application state

use vfolder::FileService;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: FileService,
}

impl AppState {
    pub fn new(service: FileService) -> Self {
        Self { service }
    }
}
