//! Provider-neutral request types and the two seams of the LLM layer.
//!
//! [`ProviderProfile`] captures what differs between wire protocols
//! (endpoint, authorization, request body, response extraction).
//! [`ChatProvider`] is the single call the orchestrator makes; the default
//! implementation is [`crate::llm::ProviderAdapter`].
//!
//! ## Message Role Mapping
//!
//! - OpenAI-compatible (OpenAI, OpenRouter, xAI): `system`, `user`, `assistant`
//! - Anthropic: `user`, `assistant`; the system prompt is a top-level field
//! - Gemini: `user`, `model`; the system prompt is `systemInstruction`

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::models::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_openai_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    pub fn as_anthropic_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    /// Gemini calls the assistant side `model`
    pub fn as_gemini_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        }
    }
}

/// One conversation message in provider-neutral form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Universal request handed to a [`ProviderProfile`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMRequest {
    pub messages: Vec<Message>,
    pub system_prompt: Option<String>,
    pub model: String,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LLMError {
    #[error("No API key configured for {provider}")]
    MissingApiKey { provider: String },
    #[error("HTTP {status}: {body}")]
    ProviderHttpError { status: u16, body: String },
    #[error("Malformed provider response: {0}")]
    MalformedProviderResponse(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Wire-protocol strategy for one provider
pub trait ProviderProfile: Send + Sync {
    fn provider(&self) -> Provider;

    /// Full URL of the completion endpoint
    fn endpoint(&self, base_url: &str, model: &str) -> String;

    /// Attach credentials and protocol headers
    fn authorize(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder;

    /// Provider JSON body for `request`
    fn build_request(&self, request: &LLMRequest) -> Result<Value, LLMError>;

    /// Assistant text from a successful response body
    fn extract_text(&self, response: &Value) -> Result<String, LLMError>;
}

/// The call the orchestrator makes for every model turn
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn send(
        &self,
        messages: &[Message],
        system_prompt: &str,
        provider: Provider,
        api_key: &str,
        model: &str,
    ) -> Result<String, LLMError>;
}

/// Concatenate the `text` fields of a block array, ignoring other block types.
/// `None` when the array holds no text at all.
pub(crate) fn join_text_blocks<'a>(
    blocks: impl IntoIterator<Item = &'a Value>,
    type_field: Option<(&str, &str)>,
) -> Option<String> {
    let mut found = false;
    let mut text = String::new();
    for block in blocks {
        if let Some((field, expected)) = type_field {
            if block.get(field).and_then(Value::as_str) != Some(expected) {
                continue;
            }
        }
        if let Some(part) = block.get("text").and_then(Value::as_str) {
            found = true;
            text.push_str(part);
        }
    }
    found.then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gemini_role_mapping_uses_model() {
        assert_eq!(MessageRole::Assistant.as_gemini_str(), "model");
        assert_eq!(MessageRole::Assistant.as_openai_str(), "assistant");
        assert_eq!(MessageRole::User.as_anthropic_str(), "user");
    }

    #[test]
    fn join_text_blocks_filters_by_type() {
        let blocks = json!([
            {"type": "text", "text": "Hello "},
            {"type": "tool_use", "text": "ignored"},
            {"type": "text", "text": "world"}
        ]);
        let joined = join_text_blocks(
            blocks.as_array().unwrap().iter(),
            Some(("type", "text")),
        );
        assert_eq!(joined.as_deref(), Some("Hello world"));
    }

    #[test]
    fn join_text_blocks_without_text_is_none() {
        let blocks = json!([{"inlineData": {}}]);
        assert_eq!(join_text_blocks(blocks.as_array().unwrap().iter(), None), None);
    }
}
