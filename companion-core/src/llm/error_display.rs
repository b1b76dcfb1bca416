//! Terminal styling for provider errors.

use console::style;

pub fn style_llm_error(message: &str) -> String {
    style(message).red().to_string()
}

/// Provider name coloured by vendor
pub fn style_provider_name(provider: &str) -> String {
    let styled_name = match provider.to_lowercase().as_str() {
        "gemini" => style(provider).blue(),
        "openai" => style(provider).yellow(),
        "anthropic" | "claude" => style(provider).magenta(),
        "xai" => style(provider).white(),
        _ => style(provider).cyan(),
    };
    styled_name.to_string()
}

/// `<provider> <error>` with both halves styled
pub fn format_llm_error(provider: &str, error: &str) -> String {
    format!(
        "{} {}",
        style_provider_name(provider),
        style_llm_error(error)
    )
}
