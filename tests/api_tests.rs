//! API integration tests

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;
use worker_registry::api::{build_router, ApiConfig, AppState};
use worker_registry::backend::{Backend, BackendError, BackendReply};
use worker_registry::config::RegistryConfig;
use worker_registry::core::records::SearchCriteria;
use worker_registry::WorkerRecord;

// ═══════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct FakeBackend {
    imports: Mutex<Vec<usize>>,
    reject: bool,
}

fn nothing<T: Default>() -> Result<T, BackendError> {
    Ok(T::default())
}

#[async_trait]
impl Backend for FakeBackend {
    async fn fetch_all(&self) -> Result<Vec<WorkerRecord>, BackendError> {
        nothing()
    }

    async fn fetch_detail_all(&self) -> Result<Vec<WorkerRecord>, BackendError> {
        nothing()
    }

    async fn search(&self, _c: &SearchCriteria) -> Result<Vec<WorkerRecord>, BackendError> {
        nothing()
    }

    async fn create(&self, _r: &WorkerRecord) -> Result<BackendReply, BackendError> {
        nothing()
    }

    async fn create_detail(&self, _r: &WorkerRecord) -> Result<BackendReply, BackendError> {
        nothing()
    }

    async fn update(&self, _r: &WorkerRecord) -> Result<BackendReply, BackendError> {
        nothing()
    }

    async fn update_detail(&self, _r: &WorkerRecord) -> Result<BackendReply, BackendError> {
        nothing()
    }

    async fn delete(&self, _id: &str) -> Result<BackendReply, BackendError> {
        nothing()
    }

    async fn bulk_import(&self, rows: &[WorkerRecord]) -> Result<BackendReply, BackendError> {
        self.imports.lock().unwrap().push(rows.len());
        if self.reject {
            return Err(BackendError::Status {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(BackendReply {
            message: Some(format!("{} data diimpor", rows.len())),
        })
    }
}

fn app(backend: Arc<FakeBackend>) -> Router {
    build_router(Arc::new(AppState::new(RegistryConfig::default(), backend)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_config_default() {
    let config = ApiConfig::default();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
}

// ═══════════════════════════════════════════════════════════════════════════
// INFO ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(Arc::default()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let (status, body) = get(app(Arc::default()), "/").await;
    assert_eq!(status, StatusCode::OK);
    let paths: Vec<&str> = body["data"]["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["path"].as_str())
        .collect();
    assert!(paths.contains(&"/api/v1/import/submit"));
    assert!(paths.contains(&"/api/v1/dates/normalize"));
}

#[tokio::test]
async fn test_version() {
    let (_, body) = get(app(Arc::default()), "/version").await;
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

// ═══════════════════════════════════════════════════════════════════════════
// DATES
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_normalize_dates() {
    let (status, body) = post(
        app(Arc::default()),
        "/api/v1/dates/normalize",
        json!({"values": ["13/1/2001", "1990-08-15", "1/13/2001"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([
            {"input": "13/1/2001", "normalized": "13/01/2001", "valid": true},
            {"input": "1990-08-15", "normalized": "15/08/1990", "valid": true},
            {"input": "1/13/2001", "normalized": "01/13/2001", "valid": false}
        ])
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_submit_with_invalid_date_is_gated() {
    let backend = Arc::new(FakeBackend::default());
    let (status, body) = post(
        app(backend.clone()),
        "/api/v1/import/submit",
        json!({"rows": [
            {"NAMA": "Budi", "TTL": "15/08/1990"},
            {"NAMA": "Siti", "TTL": "31/02/2020"}
        ]}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["submitted"], false);
    assert_eq!(body["data"]["errors"][0]["row"], 3);
    assert_eq!(body["data"]["errors"][0]["field"], "TTL");
    assert!(backend.imports.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_normalizes_and_imports_once() {
    let backend = Arc::new(FakeBackend::default());
    let (status, body) = post(
        app(backend.clone()),
        "/api/v1/import/submit",
        json!({"rows": [
            {"NAMA": "Budi", "TTL": "1990-08-15"},
            {"NAMA": "Siti", "TTL": "1.2.1985"}
        ]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["submitted"], true);
    assert_eq!(body["data"]["message"], "2 data diimpor");
    assert_eq!(*backend.imports.lock().unwrap(), vec![2]);
}

#[tokio::test]
async fn test_submit_backend_failure_is_bad_gateway() {
    let backend = Arc::new(FakeBackend {
        reject: true,
        ..FakeBackend::default()
    });
    let (status, body) = post(
        app(backend),
        "/api/v1/import/submit",
        json!({"rows": [{"NAMA": "Budi", "TTL": "15/08/1990"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "The server hit an error. Please try again.");
}

#[tokio::test]
async fn test_preview_reports_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("upload.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "NAMA").unwrap();
    sheet.write_string(0, 1, "TTL").unwrap();
    sheet.write_string(1, 0, "Budi").unwrap();
    sheet.write_string(1, 1, "32/01/2020").unwrap();
    workbook.save(&path).unwrap();

    let (status, body) = post(
        app(Arc::default()),
        "/api/v1/import/preview",
        json!({"file_path": path.to_string_lossy()}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["submittable"], false);
    assert_eq!(body["data"]["batch"]["errors"][0]["row"], 2);
}

#[tokio::test]
async fn test_preview_missing_file() {
    let (status, body) = post(
        app(Arc::default()),
        "/api/v1/import/preview",
        json!({"file_path": "/nonexistent/upload.xlsx"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT AND TEMPLATE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_export_writes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.xlsx");
    let (status, body) = post(
        app(Arc::default()),
        "/api/v1/export",
        json!({
            "records": [{"NAMA": "Budi", "TTL": "1990-08-15"}],
            "output_path": path.to_string_lossy(),
            "title": "BSTF II",
            "columns": ["NAMA", "TTL"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rows"], 1);
    assert!(path.exists());
}

#[tokio::test]
async fn test_export_rejects_empty_selection() {
    let dir = TempDir::new().unwrap();
    let (status, _) = post(
        app(Arc::default()),
        "/api/v1/export",
        json!({
            "records": [],
            "output_path": dir.path().join("out.xlsx").to_string_lossy(),
            "title": "x",
            "columns": []
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_template_writes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("template.xlsx");
    let (status, body) = post(
        app(Arc::default()),
        "/api/v1/template",
        json!({"output_path": path.to_string_lossy()}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["written"], true);
    assert!(path.exists());
}
