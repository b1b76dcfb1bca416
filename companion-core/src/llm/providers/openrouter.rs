use super::openai::{convert_to_chat_completions, parse_chat_completions_text};
use crate::config::models::Provider;
use crate::llm::provider::{LLMError, LLMRequest, ProviderProfile};
use reqwest::RequestBuilder;
use serde_json::Value;

/// OpenRouter, speaking the chat completions protocol
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenRouterProfile;

impl ProviderProfile for OpenRouterProfile {
    fn provider(&self) -> Provider {
        Provider::OpenRouter
    }

    fn endpoint(&self, base_url: &str, _model: &str) -> String {
        format!("{}/chat/completions", base_url)
    }

    fn authorize(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request.bearer_auth(api_key).header("X-Title", "Companion")
    }

    fn build_request(&self, request: &LLMRequest) -> Result<Value, LLMError> {
        convert_to_chat_completions(request)
    }

    fn extract_text(&self, response: &Value) -> Result<String, LLMError> {
        parse_chat_completions_text(response)
    }
}
