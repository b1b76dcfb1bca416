pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod openrouter;
pub mod xai;

pub use anthropic::AnthropicProfile;
pub use gemini::GeminiProfile;
pub use openai::OpenAIProfile;
pub use openrouter::OpenRouterProfile;
pub use xai::XAIProfile;

use crate::config::models::Provider;
use crate::llm::provider::ProviderProfile;

/// Wire profile for `provider`
pub fn profile_for(provider: Provider) -> &'static dyn ProviderProfile {
    match provider {
        Provider::OpenAI => &OpenAIProfile,
        Provider::Claude => &AnthropicProfile,
        Provider::OpenRouter => &OpenRouterProfile,
        Provider::Gemini => &GeminiProfile,
        Provider::XAI => &XAIProfile,
    }
}
