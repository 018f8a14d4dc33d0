//! Model client trait and request/response types.
//!
//! Defines the interface every hosted model backend implements, plus the
//! factory that builds the configured backend and fails early when
//! connection settings are missing.

use crate::config::ModelConfig;
use crate::error::{AnalysisError, ConfigError};
use async_trait::async_trait;
use base64::Engine;
use std::path::Path;
use std::time::Duration;

/// Base64-encoded image ready to send to a chat API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and a format string.
    ///
    /// The format is the file extension or format identifier (e.g., "jpeg", "png").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format.to_lowercase().as_str() {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Create an `ImageInput` using the file extension of `path` as the format.
    pub fn from_file_bytes(bytes: &[u8], path: &Path) -> Self {
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("jpeg");
        Self::from_bytes(bytes, format)
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// One piece of user-turn content.
#[derive(Debug, Clone)]
pub enum ContentPart {
    Image(ImageInput),
    Text(String),
}

/// The messages sent for one inference call: a system instruction and a
/// single user turn.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub system: String,
    pub user: Vec<ContentPart>,
}

/// Requested output shape, sent as a JSON-schema response format.
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    /// Schema name reported to the API
    pub name: String,
    /// JSON schema the reply should follow
    pub schema: serde_json::Value,
    /// Ask the API to enforce the schema strictly
    pub strict: bool,
}

/// Per-call execution settings.
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Requested reply shape, if any
    pub response_schema: Option<ResponseSchema>,
}

/// Raw reply from one model call.
#[derive(Debug, Clone)]
pub struct ModelReply {
    /// Reply text (expected, not guaranteed, to be JSON)
    pub text: String,
    /// Model identifier reported by the endpoint
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all hosted model backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn ModelClient>` for dynamic dispatch).
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Backend name for logging (e.g., "azure", "openai").
    fn name(&self) -> &str;

    /// Send one conversation and return the raw reply text.
    async fn complete(
        &self,
        conversation: &Conversation,
        settings: &ExecutionSettings,
    ) -> Result<ModelReply, AnalysisError>;
}

/// Resolve `${ENV_VAR}` references in config strings.
///
/// Empty values and unset variables resolve to `None`.
pub fn resolve_env_var(value: &str) -> Option<String> {
    let value = value.trim();
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Resolve a required setting or explain how to provide it.
pub(crate) fn require(value: &str, key: &'static str) -> Result<String, ConfigError> {
    resolve_env_var(value).ok_or_else(|| {
        let hint = match value.trim() {
            v if v.starts_with("${") && v.ends_with('}') => {
                format!("Set the {} environment variable.", &v[2..v.len() - 1])
            }
            _ => format!("Set `{key}` in the config file."),
        };
        ConfigError::MissingValue { key, hint }
    })
}

/// Factory that creates the configured model client.
pub struct ModelClientFactory;

impl ModelClientFactory {
    /// Create a client for `provider` ("azure" or "openai").
    ///
    /// `model_override` replaces the deployment (Azure) or model name (OpenAI).
    /// Missing endpoint, credential or deployment is a [`ConfigError`].
    pub fn create(
        provider: &str,
        config: &ModelConfig,
        model_override: Option<&str>,
    ) -> Result<Box<dyn ModelClient>, ConfigError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        match provider {
            "azure" => {
                let cfg = &config.azure;
                let endpoint = require(&cfg.endpoint, "model.azure.endpoint")?;
                let api_key = require(&cfg.api_key, "model.azure.api_key")?;
                let deployment = match model_override {
                    Some(name) => name.to_string(),
                    None => require(&cfg.deployment, "model.azure.deployment")?,
                };
                if let Some(model_id) = resolve_env_var(&cfg.model_id) {
                    tracing::debug!("Azure deployment '{deployment}' serves model '{model_id}'");
                }
                Ok(Box::new(super::azure::AzureOpenAiClient::new(
                    &endpoint,
                    &api_key,
                    &deployment,
                    &cfg.api_version,
                    timeout,
                )))
            }
            "openai" => {
                let cfg = &config.openai;
                let endpoint = require(&cfg.endpoint, "model.openai.endpoint")?;
                let api_key = require(&cfg.api_key, "model.openai.api_key")?;
                let model = match model_override {
                    Some(name) => name.to_string(),
                    None => require(&cfg.model, "model.openai.model")?,
                };
                Ok(Box::new(super::openai::OpenAiClient::with_endpoint(
                    &api_key, &model, &endpoint, timeout,
                )))
            }
            other => Err(ConfigError::ValidationError(format!(
                "Unknown model provider: {other} (expected \"azure\" or \"openai\")"
            ))),
        }
    }
}
