//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::dates::{is_valid_date, normalize_date_str};
use crate::error::RegistryError;
use crate::excel::{
    process_records, submit_batch, template as workbook_template, ExcelImporter, ExportRequest,
};
use crate::types::{ImportBatch, ValidationError, WorkerRecord};

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }

    /// Failure that still carries a payload (e.g. the rows that blocked it).
    pub fn fail(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: Some(message.into()),
        }
    }
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn status_for(error: &RegistryError) -> StatusCode {
    match error {
        RegistryError::Backend(_) => StatusCode::BAD_GATEWAY,
        RegistryError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        RegistryError::BatchHasErrors { .. } | RegistryError::Validation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        _ => StatusCode::BAD_REQUEST,
    }
}

fn failure<T: Serialize>(error: RegistryError) -> Reply<T> {
    (status_for(&error), Json(ApiResponse::err(error.user_message())))
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(path: &str, method: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Worker Registry API Server".to_string(),
        version: state.version.clone(),
        description: "Spreadsheet import and export for the worker registry".to_string(),
        endpoints: vec![
            endpoint("/health", "GET", "Health check endpoint"),
            endpoint("/version", "GET", "Server version"),
            endpoint(
                "/api/v1/import/preview",
                "POST",
                "Decode an .xlsx file and list invalid dates",
            ),
            endpoint(
                "/api/v1/import/submit",
                "POST",
                "Re-validate rows and bulk import them",
            ),
            endpoint("/api/v1/export", "POST", "Export records to .xlsx or PDF"),
            endpoint("/api/v1/template", "POST", "Write the import template"),
            endpoint(
                "/api/v1/dates/normalize",
                "POST",
                "Normalize and validate day-first dates",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec![
            "import".to_string(),
            "export".to_string(),
            "pdf".to_string(),
            "template".to_string(),
            "dates".to_string(),
        ],
    }))
}

/// Import preview request
#[derive(Deserialize)]
pub struct PreviewRequest {
    pub file_path: String,
}

/// Import preview response
#[derive(Serialize)]
pub struct PreviewResponse {
    pub file_path: String,
    pub submittable: bool,
    pub batch: ImportBatch,
}

/// POST /api/v1/import/preview - Decode and validate an upload
pub async fn import_preview(Json(req): Json<PreviewRequest>) -> Reply<PreviewResponse> {
    let path = PathBuf::from(&req.file_path);
    let batch = match ExcelImporter::read(&path).await.and_then(|i| i.import()) {
        Ok(batch) => batch,
        Err(e) => return failure(e),
    };

    (
        StatusCode::OK,
        Json(ApiResponse::ok(PreviewResponse {
            file_path: req.file_path,
            submittable: batch.is_submittable(),
            batch,
        })),
    )
}

/// Import submit request: rows as returned by the preview
#[derive(Deserialize)]
pub struct SubmitRequest {
    pub rows: Vec<WorkerRecord>,
}

/// Import submit response
#[derive(Serialize, Default)]
pub struct SubmitResponse {
    pub submitted: bool,
    pub rows: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
}

/// POST /api/v1/import/submit - Re-validate and bulk import
pub async fn import_submit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitRequest>,
) -> Reply<SubmitResponse> {
    let batch = process_records(req.rows);

    if !batch.is_submittable() {
        let error = RegistryError::BatchHasErrors {
            count: batch.errors.len(),
        };
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::fail(
                error.user_message(),
                SubmitResponse {
                    submitted: false,
                    rows: batch.rows.len(),
                    message: error.to_string(),
                    errors: batch.errors,
                },
            )),
        );
    }

    match submit_batch(&batch, state.backend.as_ref()).await {
        Ok(reply) => (
            StatusCode::OK,
            Json(ApiResponse::ok(SubmitResponse {
                submitted: true,
                rows: batch.rows.len(),
                message: reply.message_or("Data imported"),
                errors: Vec::new(),
            })),
        ),
        Err(e) => failure(e),
    }
}

/// Export request: records plus what and where to write
#[derive(Deserialize)]
pub struct ExportBody {
    pub records: Vec<WorkerRecord>,
    pub output_path: String,
    #[serde(flatten)]
    pub request: ExportRequest,
}

/// Export response
#[derive(Serialize, Default)]
pub struct ExportResponse {
    pub exported: bool,
    pub output_path: String,
    pub rows: usize,
    pub message: String,
}

/// POST /api/v1/export - Export records to .xlsx or PDF
pub async fn export(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExportBody>,
) -> Reply<ExportResponse> {
    let mut request = body.request;
    if request.sheet_name.is_none() {
        request.sheet_name = Some(state.config.export.sheet_name.clone());
    }

    match request.write(&body.records, &PathBuf::from(&body.output_path)) {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok(ExportResponse {
                exported: true,
                output_path: body.output_path,
                rows: body.records.len(),
                message: "Export completed".to_string(),
            })),
        ),
        Err(e) => failure(e),
    }
}

/// Template request
#[derive(Deserialize)]
pub struct TemplateRequest {
    pub output_path: String,
}

/// Template response
#[derive(Serialize, Default)]
pub struct TemplateResponse {
    pub written: bool,
    pub output_path: String,
}

/// POST /api/v1/template - Write the import template
pub async fn template(Json(req): Json<TemplateRequest>) -> Reply<TemplateResponse> {
    match workbook_template::write_template(&PathBuf::from(&req.output_path)) {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok(TemplateResponse {
                written: true,
                output_path: req.output_path,
            })),
        ),
        Err(e) => failure(e),
    }
}

/// Date normalization request
#[derive(Deserialize)]
pub struct NormalizeRequest {
    pub values: Vec<String>,
}

/// One normalized date
#[derive(Debug, Serialize, PartialEq)]
pub struct DateCheck {
    pub input: String,
    pub normalized: String,
    pub valid: bool,
}

/// POST /api/v1/dates/normalize - Normalize day-first dates
pub async fn normalize_dates(Json(req): Json<NormalizeRequest>) -> impl IntoResponse {
    let checks: Vec<DateCheck> = req
        .values
        .into_iter()
        .map(|input| {
            let normalized = normalize_date_str(&input);
            let valid = is_valid_date(&normalized);
            DateCheck {
                input,
                normalized,
                valid,
            }
        })
        .collect();
    Json(ApiResponse::ok(checks))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ApiResponse Tests ====================

    #[test]
    fn test_api_response_ok_creates_success_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test data".to_string());

        assert!(response.success);
        assert_eq!(response.data, Some("test data".to_string()));
        assert!(response.error.is_none());
        // UUID format (8-4-4-4-12)
        assert_eq!(response.request_id.len(), 36);
    }

    #[test]
    fn test_api_response_err_creates_error_response() {
        let response: ApiResponse<String> = ApiResponse::err("Something went wrong");

        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_api_response_fail_keeps_payload() {
        let response = ApiResponse::fail("blocked", SubmitResponse::default());
        assert!(!response.success);
        assert!(response.data.is_some());
        assert_eq!(response.error, Some("blocked".to_string()));
    }

    #[test]
    fn test_api_response_request_id_is_unique() {
        let response1: ApiResponse<String> = ApiResponse::ok("test1".to_string());
        let response2: ApiResponse<String> = ApiResponse::ok("test2".to_string());

        assert_ne!(response1.request_id, response2.request_id);
    }

    // ==================== Status Mapping Tests ====================

    #[test]
    fn test_status_for_errors() {
        assert_eq!(
            status_for(&RegistryError::Decode("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&RegistryError::BatchHasErrors { count: 2 }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&RegistryError::Backend(
                crate::backend::BackendError::DuplicateNik
            )),
            StatusCode::BAD_GATEWAY
        );
    }

    // ==================== Response Struct Default Tests ====================

    #[test]
    fn test_export_response_default() {
        let response = ExportResponse::default();

        assert!(!response.exported);
        assert!(response.output_path.is_empty());
        assert_eq!(response.rows, 0);
    }

    #[test]
    fn test_submit_response_skips_empty_errors() {
        let json = serde_json::to_value(SubmitResponse::default()).unwrap();
        assert!(json.get("errors").is_none());
    }
}
