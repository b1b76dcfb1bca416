use crate::config::models::Provider;
use crate::llm::provider::{LLMError, LLMRequest, ProviderProfile};
use reqwest::RequestBuilder;
use serde_json::{Value, json};

/// OpenAI chat completions
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenAIProfile;

impl ProviderProfile for OpenAIProfile {
    fn provider(&self) -> Provider {
        Provider::OpenAI
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

/// Body shared by every OpenAI-compatible surface
pub(crate) fn convert_to_chat_completions(request: &LLMRequest) -> Result<Value, LLMError> {
    if request.messages.is_empty() {
        return Err(LLMError::InvalidRequest(
            "Messages cannot be empty".to_string(),
        ));
    }

    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system_prompt) = &request.system_prompt {
        messages.push(json!({
            "role": "system",
            "content": system_prompt
        }));
    }

    for msg in &request.messages {
        messages.push(json!({
            "role": msg.role.as_openai_str(),
            "content": msg.content
        }));
    }

    let mut body = json!({
        "model": request.model,
        "messages": messages,
    });
    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    Ok(body)
}

/// `choices[0].message.content`
pub(crate) fn parse_chat_completions_text(response: &Value) -> Result<String, LLMError> {
    let choice = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| {
            LLMError::MalformedProviderResponse("missing choices".to_string())
        })?;

    let message = choice.get("message").ok_or_else(|| {
        LLMError::MalformedProviderResponse("missing message in first choice".to_string())
    })?;

    match message.get("content") {
        Some(Value::String(text)) => Ok(text.clone()),
        // Some compatible servers return content as a list of text parts
        Some(Value::Array(parts)) => crate::llm::provider::join_text_blocks(parts.iter(), None)
            .ok_or_else(|| {
                LLMError::MalformedProviderResponse("no text in message content".to_string())
            }),
        _ => Err(LLMError::MalformedProviderResponse(
            "missing message content".to_string(),
        )),
    }
}
