//! # LLM Integration Layer
//!
//! One call signature over five wire protocols:
//!
//! | Provider | Shape | Text location |
//! |----------|-------|---------------|
//! | OpenAI, OpenRouter, xAI | chat completions | `choices[0].message.content` |
//! | Claude | messages | text blocks of `content` |
//! | Gemini | generateContent | text parts of `candidates[0].content` |

pub mod adapter;
pub mod error_display;
pub mod provider;
pub mod providers;

pub use adapter::ProviderAdapter;
pub use provider::{ChatProvider, LLMError, LLMRequest, Message, MessageRole, ProviderProfile};
