//! Azure OpenAI client.
//!
//! Same Chat Completions protocol as OpenAI, but the model is selected by the
//! deployment in the URL and authentication uses the `api-key` header.

use super::openai::{send_chat, ChatRequest};
use super::provider::{Conversation, ExecutionSettings, ModelClient, ModelReply};
use crate::error::AnalysisError;
use async_trait::async_trait;
use std::time::Duration;

/// Azure OpenAI chat-completions client for a single deployment.
pub struct AzureOpenAiClient {
    api_key: String,
    deployment: String,
    url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl AzureOpenAiClient {
    pub fn new(
        endpoint: &str,
        api_key: &str,
        deployment: &str,
        api_version: &str,
        timeout: Duration,
    ) -> Self {
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            deployment,
            api_version
        );
        Self {
            api_key: api_key.to_string(),
            deployment: deployment.to_string(),
            url,
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl ModelClient for AzureOpenAiClient {
    fn name(&self) -> &str {
        "azure"
    }

    async fn complete(
        &self,
        conversation: &Conversation,
        settings: &ExecutionSettings,
    ) -> Result<ModelReply, AnalysisError> {
        let body = ChatRequest::build(None, conversation, settings);
        let request = self.client.post(&self.url).header("api-key", &self.api_key);
        let mut reply = send_chat(request, &body, "Azure OpenAI", self.timeout).await?;
        if reply.model.is_empty() {
            reply.model = self.deployment.clone();
        }
        Ok(reply)
    }
}
