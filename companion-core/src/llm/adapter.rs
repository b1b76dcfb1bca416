use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::loader::ProvidersConfig;
use crate::config::models::Provider;
use crate::llm::provider::{ChatProvider, LLMError, LLMRequest, Message};
use crate::llm::providers::profile_for;

/// Sends a conversation to whichever provider the turn selected.
///
/// Holds no per-call state; one instance is shared by every session.
#[derive(Debug, Clone)]
pub struct ProviderAdapter {
    http_client: HttpClient,
    endpoints: ProvidersConfig,
}

impl Default for ProviderAdapter {
    fn default() -> Self {
        Self::new(ProvidersConfig::default())
    }
}

impl ProviderAdapter {
    pub fn new(endpoints: ProvidersConfig) -> Self {
        Self::with_client(HttpClient::new(), endpoints)
    }

    pub fn with_client(http_client: HttpClient, endpoints: ProvidersConfig) -> Self {
        Self {
            http_client,
            endpoints,
        }
    }

    pub fn base_url(&self, provider: Provider) -> String {
        self.endpoints.base_url(provider)
    }
}

#[async_trait]
impl ChatProvider for ProviderAdapter {
    async fn send(
        &self,
        messages: &[Message],
        system_prompt: &str,
        provider: Provider,
        api_key: &str,
        model: &str,
    ) -> Result<String, LLMError> {
        if api_key.trim().is_empty() {
            return Err(LLMError::MissingApiKey {
                provider: provider.display_name().to_string(),
            });
        }

        let profile = profile_for(provider);
        let request = LLMRequest {
            messages: messages.to_vec(),
            system_prompt: (!system_prompt.trim().is_empty()).then(|| system_prompt.to_string()),
            model: model.to_string(),
            max_tokens: None,
        };
        let body = profile.build_request(&request)?;
        let url = profile.endpoint(&self.base_url(provider), model);

        debug!(
            target = "llm",
            provider = %provider,
            model = model,
            messages = messages.len(),
            "provider_request"
        );

        let response = profile
            .authorize(self.http_client.post(&url), api_key.trim())
            .json(&body)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(
                target = "llm",
                provider = %provider,
                status = status.as_u16(),
                "provider_http_error"
            );
            return Err(LLMError::ProviderHttpError {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;
        let json: Value = serde_json::from_str(&text).map_err(|e| {
            LLMError::MalformedProviderResponse(format!("Failed to parse response: {}", e))
        })?;

        let reply = profile.extract_text(&json)?;
        debug!(
            target = "llm",
            provider = %provider,
            chars = reply.len(),
            "provider_response"
        );
        Ok(reply)
    }
}
