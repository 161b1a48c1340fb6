//! Registry API Server module
//!
//! HTTP REST API over the import/export pipelines.
//! Run with `registry-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
