//! Registry configuration
//!
//! Loaded from an optional YAML file; anything missing falls back to the
//! defaults below. The backend base URL can also come from the
//! `REGISTRY_BASE_URL` environment variable or `--base-url`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost/data_check_backend";

/// Paths of each backend operation, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
    pub fetch_all: String,
    pub fetch_detail_all: String,
    pub search: String,
    pub create: String,
    pub create_detail: String,
    pub update: String,
    pub update_detail: String,
    pub delete: String,
    pub bulk_import: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            fetch_all: "fetch_abk.php".to_string(),
            fetch_detail_all: "fetch_abk_detail.php".to_string(),
            search: "find_abk.php".to_string(),
            create: "add_abk.php".to_string(),
            create_detail: "add_abk_detail.php".to_string(),
            update: "edit_abk.php".to_string(),
            update_detail: "edit_abk_detail.php".to_string(),
            delete: "delete_abk.php".to_string(),
            bulk_import: "import_abk.php".to_string(),
        }
    }
}

/// Where and how to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub endpoints: EndpointPaths,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoints: EndpointPaths::default(),
        }
    }
}

/// Export defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Suffix of the PDF title line, `DIKLAT {report_title}`.
    pub report_title: String,
    pub sheet_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            report_title: "BSTF II".to_string(),
            sheet_name: "DataPekerja".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub backend: BackendConfig,
    pub export: ExportConfig,
}

impl RegistryConfig {
    pub fn from_yaml(content: &str) -> RegistryResult<Self> {
        let config: RegistryConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> RegistryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "config file read");
        Self::from_yaml(&content)
    }

    /// File when given, defaults otherwise; then the base URL override.
    pub fn load(path: Option<&Path>, base_url: Option<String>) -> RegistryResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        if let Some(url) = base_url {
            config.backend.base_url = url;
            config.validate()?;
        }
        Ok(config)
    }

    fn validate(&self) -> RegistryResult<()> {
        let url = self.backend.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RegistryError::Config(format!(
                "backend.base_url must start with http:// or https://, got '{}'",
                self.backend.base_url
            )));
        }
        if self.export.sheet_name.trim().is_empty() || self.export.sheet_name.chars().count() > 31 {
            return Err(RegistryError::Config(
                "export.sheet_name must be 1-31 characters".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.backend.endpoints.bulk_import, "import_abk.php");
        assert_eq!(config.export.sheet_name, "DataPekerja");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
backend:
  base_url: "https://registry.example.org/api"
  endpoints:
    bulk_import: "bulk.php"
export:
  report_title: "ANKAPIN III"
"#;
        let config = RegistryConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.backend.base_url, "https://registry.example.org/api");
        assert_eq!(config.backend.endpoints.bulk_import, "bulk.php");
        assert_eq!(config.backend.endpoints.fetch_all, "fetch_abk.php");
        assert_eq!(config.export.report_title, "ANKAPIN III");
        assert_eq!(config.export.sheet_name, "DataPekerja");
    }

    #[test]
    fn test_rejects_bad_url() {
        let err = RegistryConfig::from_yaml("backend:\n  base_url: ftp://x\n").unwrap_err();
        assert!(matches!(err, RegistryError::Config(_)));
    }

    #[test]
    fn test_base_url_override() {
        let config = RegistryConfig::load(None, Some("http://10.0.0.5/backend".to_string())).unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.5/backend");
        assert!(RegistryConfig::load(None, Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("registry.yaml");
        std::fs::write(&path, "export:\n  sheet_name: Pekerja\n").unwrap();
        let config = RegistryConfig::from_file(&path).unwrap();
        assert_eq!(config.export.sheet_name, "Pekerja");
    }
}
