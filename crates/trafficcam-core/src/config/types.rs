//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Input discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory scanned for camera images (not recursive)
    pub dir: String,

    /// File extensions to pick up, without the dot
    pub extensions: Vec<String>,

    /// Match extensions case-sensitively (`jpg` does not match `JPG`)
    pub case_sensitive: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: "Images".to_string(),
            extensions: vec!["jpg".to_string()],
            case_sensitive: true,
        }
    }
}

/// Model selection and per-call settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Backend: "azure" or "openai"
    pub provider: String,

    /// Maximum tokens to generate per reply
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Azure OpenAI connection
    pub azure: AzureOpenAiConfig,

    /// OpenAI (or compatible) connection
    pub openai: OpenAiConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "azure".to_string(),
            max_tokens: 500,
            temperature: 0.2,
            timeout_ms: 60_000,
            azure: AzureOpenAiConfig::default(),
            openai: OpenAiConfig::default(),
        }
    }
}

/// Azure OpenAI configuration.
///
/// All strings support `${ENV_VAR}` syntax.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint, e.g. https://<resource>.openai.azure.com
    pub endpoint: String,

    /// API key
    pub api_key: String,

    /// Deployment name
    pub deployment: String,

    /// Model behind the deployment (informational only)
    pub model_id: String,

    /// REST API version
    pub api_version: String,
}

impl Default for AzureOpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "${AZURE_OPENAI_ENDPOINT}".to_string(),
            api_key: "${AZURE_OPENAI_API_KEY}".to_string(),
            deployment: "${AZURE_OPENAI_DEPLOYMENT}".to_string(),
            model_id: "${AZURE_OPENAI_MODEL_ID}".to_string(),
            api_version: "2024-08-01-preview".to_string(),
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Request pacing (token bucket).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Requests allowed per interval; also the burst size
    pub requests_per_interval: u32,

    /// Interval length in milliseconds
    pub interval_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            requests_per_interval: 1,
            interval_ms: 1000,
        }
    }
}

/// Retry settings for transient model failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Max retry attempts per image (0 disables retries)
    pub attempts: u32,

    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 2,
            base_delay_ms: 1000,
        }
    }
}

/// Batch behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Stop the whole batch at the first failed image
    pub fail_fast: bool,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("text" or "jsonl")
    pub format: String,

    /// Colorize console output when the terminal supports it
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            color: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
