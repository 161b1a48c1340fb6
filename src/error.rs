use thiserror::Error;

use crate::backend::BackendError;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to read spreadsheet: {0}")]
    Decode(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Import blocked: {count} row(s) still have invalid dates, fix them before importing")]
    BatchHasErrors { count: usize },

    #[error("No spreadsheet loaded, upload a file first")]
    NoBatch,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RegistryError {
    /// Message shown to staff: backend failures map to their actionable text.
    pub fn user_message(&self) -> String {
        match self {
            RegistryError::Backend(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
