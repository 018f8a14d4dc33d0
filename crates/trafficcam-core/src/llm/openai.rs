//! OpenAI Chat Completions client.
//!
//! Sends the image via data URL in the user message content array and asks
//! for a `json_schema` response format. The wire types and response handling
//! are shared with the Azure client, which speaks the same protocol.

use super::provider::{ContentPart, Conversation, ExecutionSettings, ModelClient, ModelReply};
use super::retry::retry_after_from_header;
use crate::error::AnalysisError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// OpenAI client using the Chat Completions API.
pub struct OpenAiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiClient {
    /// Create a client for `endpoint` (the API base URL, e.g.
    /// `https://api.openai.com/v1`, or any OpenAI-compatible server).
    pub fn with_endpoint(api_key: &str, model: &str, endpoint: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", endpoint.trim_end_matches('/')),
            timeout,
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
pub(crate) struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

impl ChatRequest {
    /// Build a request body. `model` is `None` for deployments that encode
    /// the model in the URL (Azure).
    pub(crate) fn build(
        model: Option<&str>,
        conversation: &Conversation,
        settings: &ExecutionSettings,
    ) -> Self {
        let user_content = conversation
            .user
            .iter()
            .map(|part| match part {
                ContentPart::Image(image) => ChatContent::ImageUrl {
                    image_url: ImageUrl {
                        url: image.data_url(),
                    },
                },
                ContentPart::Text(text) => ChatContent::Text { text: text.clone() },
            })
            .collect();

        Self {
            model: model.map(String::from),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            response_format: settings.response_schema.as_ref().map(|s| ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: s.name.clone(),
                    strict: s.strict,
                    schema: s.schema.clone(),
                },
            }),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: vec![ChatContent::Text {
                        text: conversation.system.clone(),
                    }],
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    model: String,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

/// Send a prepared request and turn the response into a [`ModelReply`].
///
/// `label` prefixes error messages ("OpenAI", "Azure OpenAI").
pub(crate) async fn send_chat(
    request: reqwest::RequestBuilder,
    body: &ChatRequest,
    label: &str,
    timeout: Duration,
) -> Result<ModelReply, AnalysisError> {
    let start = Instant::now();

    let resp = request
        .header("Content-Type", "application/json")
        .json(body)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AnalysisError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                }
            } else if e.is_connect() || e.is_request() {
                AnalysisError::Connect {
                    message: format!("{label} request failed: {}", error_chain(&e)),
                }
            } else {
                AnalysisError::remote(format!("{label} request failed: {e}"))
            }
        })?;

    let status = resp.status();
    if !status.is_success() {
        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(retry_after_from_header);
        let text = resp.text().await.unwrap_or_default();
        return Err(AnalysisError::Remote {
            message: format!("{label} HTTP {status}: {text}"),
            status_code: Some(status.as_u16()),
            retry_after,
        });
    }

    let chat_resp: ChatResponse = resp
        .json()
        .await
        .map_err(|e| AnalysisError::remote(format!("Failed to parse {label} response: {e}")))?;

    let text = chat_resp
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .ok_or_else(|| {
            AnalysisError::remote(format!(
                "{label} returned empty choices array, no content generated"
            ))
        })?;

    Ok(ModelReply {
        text: text.trim().to_string(),
        model: chat_resp.model,
        tokens_used: chat_resp.usage.map(|u| u.total_tokens),
        latency_ms: start.elapsed().as_millis() as u64,
    })
}

/// `e` followed by its sources, so "connection refused" is not hidden
/// behind reqwest's generic "error sending request".
fn error_chain(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        conversation: &Conversation,
        settings: &ExecutionSettings,
    ) -> Result<ModelReply, AnalysisError> {
        let body = ChatRequest::build(Some(&self.model), conversation, settings);
        let request = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key));
        send_chat(request, &body, "OpenAI", self.timeout).await
    }
}
