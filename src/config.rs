//! Configuration types for the search console.

use crate::error::{ConsoleError, Result};
use crate::view::ViewState;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use unisearch_client::ClientConfig;

/// Top-level configuration, loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Backend endpoint and request settings.
    pub backend: ClientConfig,
    /// Initial source filter and sort mode.
    pub view: ViewState,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Where exported files are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Download directory. Defaults to the platform download folder.
    pub directory: Option<PathBuf>,
}

/// Log output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: Option<String>,
    /// When set, logs are also written to daily files in this directory.
    pub directory: Option<PathBuf>,
}

impl ConsoleConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConsoleError::Config(e.to_string()))
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ConsoleError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/unisearch/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("unisearch")
            .join("config.toml")
    }

    /// Directory exports are written to.
    pub fn download_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Check the configuration for values the console cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.backend
            .validate()
            .map_err(|e| ConsoleError::Config(e.to_string()))?;
        if self
            .logging
            .filter
            .as_deref()
            .is_some_and(|f| f.trim().is_empty())
        {
            return Err(ConsoleError::Config("logging.filter must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::view::{SortMode, SourceFilter};
    use unisearch_client::Source;

    #[test]
    fn default_config_is_valid() {
        let config = ConsoleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.view, ViewState::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: ConsoleConfig = toml::from_str(
            r#"
            [backend]
            base_url = "https://search.example/api"

            [view]
            filter = "YouTube"
            sort = "za"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "https://search.example/api");
        assert_eq!(config.backend.timeout_seconds, ClientConfig::default().timeout_seconds);
        assert_eq!(config.view.filter, SourceFilter::Only(Source::YouTube));
        assert_eq!(config.view.sort, SortMode::Za);
        assert!(config.export.directory.is_none());
    }

    #[test]
    fn unknown_filter_rejected() {
        let result: std::result::Result<ConsoleConfig, _> = toml::from_str(
            r#"
            [view]
            filter = "Bing"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = ConsoleConfig::default();
        config.backend.num_results = 8;
        config.view.sort = SortMode::Az;
        config.export.directory = Some(dir.path().join("downloads"));
        config.logging.filter = Some("unisearch=debug".into());
        config.save_to_file(&path).unwrap();

        let loaded = ConsoleConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = ConsoleConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConsoleError::Io(_))));
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();
        assert!(matches!(ConsoleConfig::from_file(&path), Err(ConsoleError::Config(_))));
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = ConsoleConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("unisearch"));
    }

    #[test]
    fn explicit_download_dir_wins() {
        let mut config = ConsoleConfig::default();
        config.export.directory = Some(PathBuf::from("/srv/exports"));
        assert_eq!(config.download_dir(), PathBuf::from("/srv/exports"));
    }

    #[test]
    fn invalid_backend_rejected() {
        let mut config = ConsoleConfig::default();
        config.backend.base_url = "ftp://nope".into();
        assert!(matches!(config.validate(), Err(ConsoleError::Config(_))));
    }

    #[test]
    fn blank_log_filter_rejected() {
        let mut config = ConsoleConfig::default();
        config.logging.filter = Some("  ".into());
        assert!(config.validate().is_err());
    }
}
