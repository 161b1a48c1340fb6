use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{Backend, BackendError, BackendReply, BackendResponse};
use crate::config::{BackendConfig, EndpointPaths};
use crate::core::records::SearchCriteria;
use crate::types::WorkerRecord;

/// reqwest-backed client. No request timeout is set: a call ends only when
/// the server answers or the connection fails.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    endpoints: EndpointPaths,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_records(&self, path: &str) -> Result<Vec<WorkerRecord>, BackendError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(BackendError::from_reqwest)?;
        records_from(read_envelope(response).await?)
    }

    async fn post_records<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<WorkerRecord>, BackendError> {
        let url = self.url(path);
        debug!(%url, "POST (read)");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(BackendError::from_reqwest)?;
        records_from(read_envelope(response).await?)
    }

    async fn post_write<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<BackendReply, BackendError> {
        let url = self.url(path);
        debug!(%url, "POST (write)");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(BackendError::from_reqwest)?;

        let envelope: BackendResponse<serde_json::Value> = read_envelope(response).await?;
        if is_duplicate_nik(envelope.message.as_deref()) {
            warn!(%url, "backend reported a duplicate NIK");
            return Err(BackendError::DuplicateNik);
        }
        if envelope.is_success() {
            return Ok(BackendReply {
                message: envelope.message,
            });
        }

        let err = BackendError::rejected(envelope.message, fallback);
        warn!(%url, error = %err, "backend rejected write");
        Err(err)
    }
}

/// Decode the envelope, turning non-2xx answers into [`BackendError::Status`]
/// (or the duplicate-NIK conflict when that is what the body says).
async fn read_envelope<T: DeserializeOwned>(
    response: Response,
) -> Result<BackendResponse<T>, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<BackendResponse<serde_json::Value>>(&body)
            .ok()
            .and_then(|e| e.message);

        if is_duplicate_nik(message.as_deref()) {
            return Err(BackendError::DuplicateNik);
        }

        let message = message.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
        warn!(status = status.as_u16(), %message, "backend error status");
        return Err(BackendError::Status {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<BackendResponse<T>>()
        .await
        .map_err(BackendError::from_reqwest)
}

/// The duplicate-NIK conflict is signalled by message alone, whatever the
/// envelope status says.
fn is_duplicate_nik(message: Option<&str>) -> bool {
    message.is_some_and(|m| m.trim() == super::DUPLICATE_NIK_MESSAGE)
}

fn records_from(
    envelope: BackendResponse<Vec<WorkerRecord>>,
) -> Result<Vec<WorkerRecord>, BackendError> {
    if envelope.is_success() {
        Ok(envelope.data.unwrap_or_default())
    } else {
        Err(BackendError::rejected(
            envelope.message,
            "Unknown error from backend",
        ))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_all(&self) -> Result<Vec<WorkerRecord>, BackendError> {
        self.get_records(&self.endpoints.fetch_all).await
    }

    async fn fetch_detail_all(&self) -> Result<Vec<WorkerRecord>, BackendError> {
        self.get_records(&self.endpoints.fetch_detail_all).await
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<WorkerRecord>, BackendError> {
        if criteria.is_blank() {
            debug!("blank search criteria, skipping request");
            return Ok(Vec::new());
        }
        self.post_records(&self.endpoints.search, criteria).await
    }

    async fn create(&self, record: &WorkerRecord) -> Result<BackendReply, BackendError> {
        self.post_write(&self.endpoints.create, record, "Create failed")
            .await
    }

    async fn create_detail(&self, record: &WorkerRecord) -> Result<BackendReply, BackendError> {
        self.post_write(&self.endpoints.create_detail, record, "Create failed")
            .await
    }

    async fn update(&self, record: &WorkerRecord) -> Result<BackendReply, BackendError> {
        self.post_write(&self.endpoints.update, record, "Update failed")
            .await
    }

    async fn update_detail(&self, record: &WorkerRecord) -> Result<BackendReply, BackendError> {
        self.post_write(&self.endpoints.update_detail, record, "Update failed")
            .await
    }

    async fn delete(&self, id: &str) -> Result<BackendReply, BackendError> {
        let body = serde_json::json!({ "id": id });
        self.post_write(&self.endpoints.delete, &body, "Delete failed")
            .await
    }

    async fn bulk_import(&self, rows: &[WorkerRecord]) -> Result<BackendReply, BackendError> {
        self.post_write(&self.endpoints.bulk_import, rows, "Import failed")
            .await
    }
}
