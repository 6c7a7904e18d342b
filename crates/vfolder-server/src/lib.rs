//! vfolder-server - HTTP surface for the vfolder namespace
//!
//! Routes browse, download and upload requests onto a [`vfolder::FileService`]
//! and renders failures as `{code, message, timestamp}` JSON.

pub mod api;
pub mod error;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use server::{build_router, run_server};
pub use state::AppState;
