use crate::config::constants::{defaults, urls};
use crate::config::models::Provider;
use crate::llm::provider::{LLMError, LLMRequest, ProviderProfile, join_text_blocks};
use reqwest::RequestBuilder;
use serde_json::{Value, json};

/// Anthropic messages API
#[derive(Debug, Default, Clone, Copy)]
pub struct AnthropicProfile;

impl ProviderProfile for AnthropicProfile {
    fn provider(&self) -> Provider {
        Provider::Claude
    }

    fn endpoint(&self, base_url: &str, _model: &str) -> String {
        format!("{}/messages", base_url)
    }

    fn authorize(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request
            .header("x-api-key", api_key)
            .header("anthropic-version", urls::ANTHROPIC_API_VERSION)
    }

    fn build_request(&self, request: &LLMRequest) -> Result<Value, LLMError> {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .filter(|msg| !msg.content.is_empty())
            .map(|msg| {
                json!({
                    "role": msg.role.as_anthropic_str(),
                    "content": [{"type": "text", "text": msg.content}]
                })
            })
            .collect();

        if messages.is_empty() {
            return Err(LLMError::InvalidRequest(
                "No convertible messages for Anthropic request".to_string(),
            ));
        }

        let mut anthropic_request = json!({
            "model": request.model,
            "messages": messages,
            "max_tokens": request
                .max_tokens
                .unwrap_or(defaults::ANTHROPIC_DEFAULT_MAX_TOKENS),
        });

        if let Some(system_prompt) = &request.system_prompt {
            anthropic_request["system"] = json!(system_prompt);
        }

        Ok(anthropic_request)
    }

    fn extract_text(&self, response: &Value) -> Result<String, LLMError> {
        let content = response
            .get("content")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                LLMError::MalformedProviderResponse("missing content".to_string())
            })?;

        join_text_blocks(content.iter(), Some(("type", "text"))).ok_or_else(|| {
            LLMError::MalformedProviderResponse("no text blocks in content".to_string())
        })
    }
}
