//! Worker registry backend
//!
//! The backend is an opaque JSON-over-HTTP service. Every response carries a
//! `status` discriminator (`"success"` or anything else) plus `data` for
//! reads or a `message` for writes.

mod client;
mod error;

pub use client::HttpBackend;
pub use error::{BackendError, DUPLICATE_NIK_MESSAGE};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::records::SearchCriteria;
use crate::types::WorkerRecord;

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> BackendResponse<T> {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendReply {
    pub message: Option<String>,
}

impl BackendReply {
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Operations the registry needs from its backend.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<WorkerRecord>, BackendError>;

    async fn fetch_detail_all(&self) -> Result<Vec<WorkerRecord>, BackendError>;

    /// Blank criteria return an empty list without a request.
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<WorkerRecord>, BackendError>;

    async fn create(&self, record: &WorkerRecord) -> Result<BackendReply, BackendError>;

    async fn create_detail(&self, record: &WorkerRecord) -> Result<BackendReply, BackendError>;

    async fn update(&self, record: &WorkerRecord) -> Result<BackendReply, BackendError>;

    async fn update_detail(&self, record: &WorkerRecord) -> Result<BackendReply, BackendError>;

    async fn delete(&self, id: &str) -> Result<BackendReply, BackendError>;

    async fn bulk_import(&self, rows: &[WorkerRecord]) -> Result<BackendReply, BackendError>;
}
