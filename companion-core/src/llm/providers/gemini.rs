use crate::config::models::Provider;
use crate::llm::provider::{LLMError, LLMRequest, ProviderProfile, join_text_blocks};
use reqwest::RequestBuilder;
use serde_json::{Value, json};

/// Google Gemini `generateContent`
#[derive(Debug, Default, Clone, Copy)]
pub struct GeminiProfile;

impl ProviderProfile for GeminiProfile {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn endpoint(&self, base_url: &str, model: &str) -> String {
        format!("{}/models/{}:generateContent", base_url, model)
    }

    fn authorize(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request.query(&[("key", api_key)])
    }

    fn build_request(&self, request: &LLMRequest) -> Result<Value, LLMError> {
        let contents: Vec<Value> = request
            .messages
            .iter()
            .filter(|msg| !msg.content.is_empty())
            .map(|msg| {
                json!({
                    "role": msg.role.as_gemini_str(),
                    "parts": [{"text": msg.content}]
                })
            })
            .collect();

        if contents.is_empty() {
            return Err(LLMError::InvalidRequest(
                "No convertible messages for Gemini request".to_string(),
            ));
        }

        let mut gemini_request = json!({ "contents": contents });

        if let Some(system_prompt) = &request.system_prompt {
            gemini_request["systemInstruction"] = json!({
                "parts": [{"text": system_prompt}]
            });
        }

        if let Some(max_tokens) = request.max_tokens {
            gemini_request["generationConfig"] = json!({ "maxOutputTokens": max_tokens });
        }

        Ok(gemini_request)
    }

    fn extract_text(&self, response: &Value) -> Result<String, LLMError> {
        let parts = response
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                LLMError::MalformedProviderResponse(
                    "missing candidates[0].content.parts".to_string(),
                )
            })?;

        join_text_blocks(parts.iter(), None).ok_or_else(|| {
            LLMError::MalformedProviderResponse("no text parts in candidate".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::Message;

    #[test]
    fn assistant_turns_become_model_role() {
        let request = LLMRequest {
            messages: vec![Message::user("hi"), Message::assistant("hello")],
            system_prompt: Some("sys".to_string()),
            model: "gemini-2.5-flash".to_string(),
            max_tokens: None,
        };
        let body = GeminiProfile.build_request(&request).unwrap();
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
    }

    #[test]
    fn endpoint_embeds_model() {
        assert_eq!(
            GeminiProfile.endpoint("https://example.test/v1beta", "gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn text_parts_are_concatenated() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "a"}, {"text": "b"}]}
            }]
        });
        assert_eq!(GeminiProfile.extract_text(&body).unwrap(), "ab");
    }

    #[test]
    fn blocked_candidate_is_malformed() {
        let body = json!({"candidates": [{"finishReason": "SAFETY"}]});
        assert!(matches!(
            GeminiProfile.extract_text(&body),
            Err(LLMError::MalformedProviderResponse(_))
        ));
    }
}
