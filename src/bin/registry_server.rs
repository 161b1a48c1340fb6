//! Registry API Server binary
//!
//! HTTP REST API for the worker registry spreadsheet pipelines.

use clap::Parser;
use std::path::PathBuf;
use worker_registry::api::{run_api_server, ApiConfig};
use worker_registry::config::RegistryConfig;

#[derive(Parser, Debug)]
#[command(name = "registry-server")]
#[command(version)]
#[command(about = "Registry API Server - HTTP REST API for worker spreadsheet import/export")]
#[command(long_about = r#"
Registry API Server - HTTP REST API

Provides RESTful endpoints for the registry pipelines:
  - POST /api/v1/import/preview  - Decode an .xlsx file, list invalid dates
  - POST /api/v1/import/submit   - Re-validate rows and bulk import them
  - POST /api/v1/export          - Export records to .xlsx or PDF
  - POST /api/v1/template        - Write the import template
  - POST /api/v1/dates/normalize - Normalize day-first dates

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Example usage:
  registry-server                           # Start on localhost:8080
  registry-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/dates/normalize \
    -H "Content-Type: application/json" \
    -d '{"values": ["13/1/2001", "1990-08-15"]}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "REGISTRY_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "REGISTRY_PORT")]
    port: u16,

    /// YAML config file
    #[arg(short, long, env = "REGISTRY_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, env = "REGISTRY_BASE_URL")]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let registry = RegistryConfig::load(args.config.as_deref(), args.base_url)?;
    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config, registry).await
}
