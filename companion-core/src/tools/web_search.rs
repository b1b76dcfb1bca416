//! `web_search` tool backed by a pluggable [`SearchBackend`]

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::registry::ToolError;
use super::traits::{Tool, required_param};
use super::types::{ToolContext, ToolOutput, ToolParams};
use crate::config::constants::{defaults, tool_params, tools, urls};

const DESCRIPTION: &str = r#"## web_search
Search the web for current information.
Usage:
<web_search>
<query>what to search for</query>
<limit>number of results, optional (default 5, max 20)</limit>
</web_search>"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        query: &str,
        limit: u32,
        api_key: &str,
    ) -> Result<Vec<SearchResult>, ToolError>;
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWebResults>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResults {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Brave web search API client
#[derive(Debug, Clone)]
pub struct BraveSearchBackend {
    http_client: HttpClient,
    base_url: String,
}

impl Default for BraveSearchBackend {
    fn default() -> Self {
        Self::new(urls::BRAVE_SEARCH_API_BASE)
    }
}

impl BraveSearchBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchBackend for BraveSearchBackend {
    async fn search(
        &self,
        query: &str,
        limit: u32,
        api_key: &str,
    ) -> Result<Vec<SearchResult>, ToolError> {
        if api_key.trim().is_empty() {
            return Err(ToolError::execution("Brave Search API key is not set"));
        }

        let url = format!("{}/web/search", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key.trim())
            .query(&[("q", query.to_string()), ("count", limit.to_string())])
            .send()
            .await
            .map_err(|e| ToolError::execution(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            warn!(
                target = "tools",
                status = response.status().as_u16(),
                "web_search_http_error"
            );
            return Err(ToolError::execution(format!(
                "API request failed with status: {}",
                response.status()
            )));
        }

        let body: BraveResponse = response
            .json()
            .await
            .map_err(|e| ToolError::execution(format!("Failed to parse response: {}", e)))?;

        let mut results = body.web.map(|web| web.results).unwrap_or_default();
        results.truncate(limit as usize);
        Ok(results)
    }
}

pub struct WebSearchTool {
    backend: Arc<dyn SearchBackend>,
}

impl WebSearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

/// `limit` parameter: default when absent, clamped to the supported range.
/// Non-integers are rejected.
fn parse_limit(params: &ToolParams) -> Result<u32, ToolError> {
    let Some(raw) = params
        .get(tool_params::LIMIT)
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
    else {
        return Ok(defaults::WEB_SEARCH_DEFAULT_LIMIT);
    };

    let value: i64 = raw.parse().map_err(|_| ToolError::InvalidParameters {
        tool: tools::WEB_SEARCH.to_string(),
        message: format!("limit must be an integer, got '{}'", raw),
    })?;
    Ok(value.clamp(1, defaults::WEB_SEARCH_MAX_LIMIT as i64) as u32)
}

/// Markdown list handed back to the model
pub fn format_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No results found for \"{}\".", query);
    }

    let mut out = format!("## Search results for \"{}\"\n", query);
    for (index, result) in results.iter().enumerate() {
        out.push_str(&format!("\n{}. [{}]({})", index + 1, result.title, result.url));
        let description = result.description.trim();
        if !description.is_empty() {
            out.push_str(&format!("\n   {}", description));
        }
        out.push('\n');
    }
    out
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        tools::WEB_SEARCH
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn validate_args(&self, params: &ToolParams) -> Result<(), ToolError> {
        required_param(tools::WEB_SEARCH, params, tool_params::QUERY)?;
        parse_limit(params).map(|_| ())
    }

    async fn execute(
        &self,
        params: &ToolParams,
        context: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let query = required_param(tools::WEB_SEARCH, params, tool_params::QUERY)?;
        let limit = parse_limit(params)?;
        let api_key = context.search_api_key.as_deref().unwrap_or_default();

        info!(target = "tools", query = %query, limit, "web_search_run");
        let results = self.backend.search(query, limit, api_key).await?;

        Ok(ToolOutput::text(format_results(query, &results)).with_details(json!({
            "query": query,
            "limit": limit,
            "results": results,
        })))
    }
}
