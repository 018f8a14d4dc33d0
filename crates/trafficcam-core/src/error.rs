//! Error types for trafficcam.
//!
//! Configuration problems are fatal and surface before any image is read.
//! Per-image problems are [`AnalysisError`]s and carry enough context for the
//! batch driver to classify them and keep going.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for trafficcam operations.
#[derive(Error, Debug)]
pub enum TrafficError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Per-image analysis errors (only surfaced in fail-fast mode)
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A required connection value is absent or resolves to nothing
    #[error("{key} is not configured. {hint}")]
    MissingValue { key: &'static str, hint: String },
}

/// Errors produced while analyzing a single image.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The image file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The model endpoint rejected the call or could not be reached
    #[error("{message}")]
    Remote {
        message: String,
        /// HTTP status code, when the failure came from an HTTP response
        status_code: Option<u16>,
        /// Server-provided `Retry-After` hint
        retry_after: Option<Duration>,
    },

    /// The endpoint could not be reached or the request could not be sent
    #[error("{message}")]
    Connect { message: String },

    /// The model call did not finish in time
    #[error("Model request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The reply could not be decoded into a camera result
    #[error("Unparseable model reply: {message}")]
    Parse { message: String },
}

/// Coarse failure category used for batch accounting and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Read,
    Transport,
    Parse,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Read => write!(f, "read"),
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::Parse => write!(f, "parse"),
        }
    }
}

impl AnalysisError {
    /// Build a remote error without HTTP context (undecodable body, empty reply).
    pub fn remote(message: impl Into<String>) -> Self {
        AnalysisError::Remote {
            message: message.into(),
            status_code: None,
            retry_after: None,
        }
    }

    /// Category of this failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::Read { .. } => FailureKind::Read,
            AnalysisError::Remote { .. }
            | AnalysisError::Connect { .. }
            | AnalysisError::Timeout { .. } => FailureKind::Transport,
            AnalysisError::Parse { .. } => FailureKind::Parse,
        }
    }
}

/// Convenience type alias for trafficcam results.
pub type Result<T> = std::result::Result<T, TrafficError>;

/// Convenience type alias for per-image results.
pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_counts_as_transport() {
        let err = AnalysisError::Timeout { timeout_ms: 500 };
        assert_eq!(err.kind(), FailureKind::Transport);
        assert!(err.to_string().contains("500ms"));
    }

    #[test]
    fn test_connect_counts_as_transport() {
        let err = AnalysisError::Connect {
            message: "connection refused".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[test]
    fn test_missing_value_message_includes_hint() {
        let err = ConfigError::MissingValue {
            key: "model.azure.endpoint",
            hint: "Set AZURE_OPENAI_ENDPOINT.".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("model.azure.endpoint is not configured"));
        assert!(msg.contains("AZURE_OPENAI_ENDPOINT"));
    }
}
