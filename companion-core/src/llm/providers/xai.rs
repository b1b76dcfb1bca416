use super::openai::{convert_to_chat_completions, parse_chat_completions_text};
use crate::config::models::Provider;
use crate::llm::provider::{LLMError, LLMRequest, ProviderProfile};
use reqwest::RequestBuilder;
use serde_json::Value;

/// xAI Grok; OpenAI-compatible
#[derive(Debug, Default, Clone, Copy)]
pub struct XAIProfile;

impl ProviderProfile for XAIProfile {
    fn provider(&self) -> Provider {
        Provider::XAI
    }

    fn endpoint(&self, base_url: &str, _model: &str) -> String {
        format!("{}/chat/completions", base_url)
    }

    fn authorize(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request.bearer_auth(api_key)
    }

    fn build_request(&self, request: &LLMRequest) -> Result<Value, LLMError> {
        convert_to_chat_completions(request)
    }

    fn extract_text(&self, response: &Value) -> Result<String, LLMError> {
        parse_chat_completions_text(response)
    }
}
