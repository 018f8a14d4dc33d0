//! Single-image analysis: read, prompt, call the model, parse the reply.

use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AnalysisError, AnalysisResult};
use crate::llm::{backoff_duration, is_retryable, ExecutionSettings, ModelClient};
use crate::prompt;
use crate::reply::parse_camera_result;
use crate::types::CameraResult;

use super::pacing::RateLimiter;

/// Per-call settings for the analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Maximum tokens to generate per reply
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum retries per image
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.2,
            timeout_ms: 60_000,
            retry_attempts: 2,
            retry_delay_ms: 1000,
        }
    }
}

impl AnalyzerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_tokens: config.model.max_tokens,
            temperature: config.model.temperature,
            timeout_ms: config.model.timeout_ms,
            retry_attempts: config.retry.attempts,
            retry_delay_ms: config.retry.base_delay_ms,
        }
    }
}

/// Everything known about one image after analysis.
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// Parsed result or the failure that stopped this image
    pub result: AnalysisResult<CameraResult>,
    /// Model identifier from the reply that was parsed
    pub model: Option<String>,
    /// Latency of the call whose reply was parsed
    pub latency_ms: Option<u64>,
    /// Model calls made for this image
    pub attempts: u32,
}

impl AnalysisOutcome {
    fn failed(error: AnalysisError, attempts: u32) -> Self {
        Self {
            result: Err(error),
            model: None,
            latency_ms: None,
            attempts,
        }
    }
}

/// Sends camera images to a model client, one at a time, under a pacer.
pub struct TrafficAnalyzer {
    client: Box<dyn ModelClient>,
    limiter: RateLimiter,
    settings: ExecutionSettings,
    options: AnalyzerOptions,
}

impl TrafficAnalyzer {
    pub fn new(client: Box<dyn ModelClient>, limiter: RateLimiter, options: AnalyzerOptions) -> Self {
        let settings = prompt::execution_settings(options.max_tokens, options.temperature);
        Self {
            client,
            limiter,
            settings,
            options,
        }
    }

    /// Name of the underlying model client.
    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    /// Analyze one image file.
    ///
    /// Retryable transport failures are retried with exponential backoff; a
    /// rate-limit rejection carrying `Retry-After` also throttles the pacer.
    /// Parse failures are never retried.
    pub async fn analyze(&mut self, path: &Path) -> AnalysisOutcome {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(source) => {
                return AnalysisOutcome::failed(
                    AnalysisError::Read {
                        path: path.to_path_buf(),
                        source,
                    },
                    0,
                );
            }
        };

        let conversation = prompt::camera_conversation(&bytes, path);
        drop(bytes);

        let timeout = Duration::from_millis(self.options.timeout_ms);
        let mut attempt: u32 = 0;

        loop {
            let waited = self.limiter.acquire().await;
            if waited >= Duration::from_millis(1) {
                tracing::debug!("Paced {:?} before calling {}", waited, self.client.name());
            }

            let call = tokio::time::timeout(timeout, self.client.complete(&conversation, &self.settings));
            let error = match call.await {
                Ok(Ok(reply)) => {
                    tracing::debug!(
                        "{:?}: reply from {} in {}ms ({} tokens)",
                        path,
                        reply.model,
                        reply.latency_ms,
                        reply
                            .tokens_used
                            .map_or_else(|| "unknown".to_string(), |t| t.to_string())
                    );
                    let result = parse_camera_result(&reply.text);
                    if let Err(e) = &result {
                        tracing::debug!("Unparseable reply for {:?} ({e}): {}", path, reply.text);
                    }
                    return AnalysisOutcome {
                        result,
                        model: Some(reply.model),
                        latency_ms: Some(reply.latency_ms),
                        attempts: attempt + 1,
                    };
                }
                Ok(Err(e)) => e,
                Err(_) => AnalysisError::Timeout {
                    timeout_ms: self.options.timeout_ms,
                },
            };

            if let AnalysisError::Remote {
                retry_after: Some(retry_after),
                ..
            } = &error
            {
                self.limiter.throttle(*retry_after);
            }

            if attempt >= self.options.retry_attempts || !is_retryable(&error) {
                return AnalysisOutcome::failed(error, attempt + 1);
            }

            let delay = backoff_duration(attempt, self.options.retry_delay_ms);
            attempt += 1;
            tracing::warn!(
                "Retry {attempt}/{} for {:?} after {delay:?}: {error}",
                self.options.retry_attempts,
                path
            );
            tokio::time::sleep(delay).await;
        }
    }
}
