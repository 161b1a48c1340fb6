//! Upload → preview → submit lifecycle of one import batch

use std::path::Path;
use tracing::{info, warn};

use super::importer::ExcelImporter;
use crate::backend::{Backend, BackendReply};
use crate::error::{RegistryError, RegistryResult};
use crate::types::ImportBatch;

/// Send a batch to the backend's bulk-import endpoint.
///
/// Refused without any network call while the batch still has validation
/// errors.
pub async fn submit_batch(
    batch: &ImportBatch,
    backend: &dyn Backend,
) -> RegistryResult<BackendReply> {
    if !batch.is_submittable() {
        warn!(
            errors = batch.errors.len(),
            "import refused, batch has invalid rows"
        );
        return Err(RegistryError::BatchHasErrors {
            count: batch.errors.len(),
        });
    }

    let reply = backend.bulk_import(&batch.rows).await?;
    info!(rows = batch.rows.len(), "batch imported");
    Ok(reply)
}

/// Holds the batch currently being previewed, at most one at a time.
#[derive(Debug, Default)]
pub struct ImportSession {
    batch: Option<ImportBatch>,
}

impl ImportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch(&self) -> Option<&ImportBatch> {
        self.batch.as_ref()
    }

    /// Replace the current batch with a freshly processed upload. When the
    /// bytes cannot be decoded the previous batch is kept.
    pub fn load(&mut self, bytes: Vec<u8>) -> RegistryResult<&ImportBatch> {
        let batch = ExcelImporter::new(bytes).import()?;
        Ok(self.batch.insert(batch))
    }

    pub async fn load_file<P: AsRef<Path>>(&mut self, path: P) -> RegistryResult<&ImportBatch> {
        let batch = ExcelImporter::read(path).await?.import()?;
        Ok(self.batch.insert(batch))
    }

    /// Submit the loaded batch; it is cleared only when the backend accepts it.
    pub async fn submit(&mut self, backend: &dyn Backend) -> RegistryResult<BackendReply> {
        let batch = self.batch.as_ref().ok_or(RegistryError::NoBatch)?;
        let reply = submit_batch(batch, backend).await?;
        self.batch = None;
        Ok(reply)
    }

    pub fn reset(&mut self) {
        self.batch = None;
    }
}
