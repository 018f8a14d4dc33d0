//! Configuration management for trafficcam.
//!
//! Configuration is loaded from a TOML file in the platform config directory
//! (or an explicit path) with sensible defaults. Connection values default to
//! `${ENV_VAR}` references so the tool also runs from the environment alone.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for trafficcam.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input discovery settings
    pub input: InputConfig,

    /// Model backend settings
    pub model: ModelConfig,

    /// Request pacing
    pub pacing: PacingConfig,

    /// Retry settings
    pub retry: RetryConfig,

    /// Batch behavior
    pub batch: BatchConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path when given, otherwise from the default location.
    ///
    /// An explicit path that does not exist is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.trafficcam.trafficcam/config.toml
    /// - Linux: ~/.config/trafficcam/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\trafficcam\config\config.toml
    ///
    /// Falls back to ~/.trafficcam/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "trafficcam", "trafficcam")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".trafficcam").join("config.toml")
            })
    }

    /// Get the resolved input directory (with ~ expansion).
    pub fn input_dir(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.input.dir);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.dir, "Images");
        assert_eq!(config.input.extensions, vec!["jpg".to_string()]);
        assert!(config.input.case_sensitive);
        assert_eq!(config.model.provider, "azure");
        assert_eq!(config.pacing.requests_per_interval, 1);
        assert_eq!(config.pacing.interval_ms, 1000);
        assert!(!config.batch.fail_fast);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[input]"));
        assert!(toml.contains("[model.azure]"));
        assert!(toml.contains("${AZURE_OPENAI_ENDPOINT}"));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[model.azure]\nendpoint = \"https://traffic.openai.azure.com\"\n\n[pacing]\ninterval_ms = 250"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.model.azure.endpoint, "https://traffic.openai.azure.com");
        assert_eq!(config.model.azure.api_key, "${AZURE_OPENAI_API_KEY}");
        assert_eq!(config.pacing.interval_ms, 250);
        assert_eq!(config.pacing.requests_per_interval, 1);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pacing]\ninterval_ms = 0").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let err = Config::load_or_default(Some(Path::new("/nonexistent/trafficcam.toml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }

    #[test]
    fn test_input_dir_expands_tilde() {
        let mut config = Config::default();
        config.input.dir = "~/cams".to_string();
        let dir = config.input_dir();
        assert!(dir.ends_with("cams"));
        if let Ok(home) = std::env::var("HOME") {
            assert!(dir.starts_with(home));
        }
    }
}
