//! Hosted model integration.
//!
//! Provides a client abstraction over chat-completions backends (Azure
//! OpenAI, OpenAI) plus retry classification for transient failures.

pub(crate) mod azure;
pub(crate) mod openai;
pub(crate) mod provider;
pub(crate) mod retry;

pub use azure::AzureOpenAiClient;
pub use openai::OpenAiClient;
pub use provider::{
    resolve_env_var, ContentPart, Conversation, ExecutionSettings, ImageInput, ModelClient,
    ModelClientFactory, ModelReply, ResponseSchema,
};
pub use retry::{backoff_duration, is_retryable};
