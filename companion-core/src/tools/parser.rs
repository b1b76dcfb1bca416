//! Detects a tag-grammar tool call in free-form model text.
//!
//! ```text
//! <toolName>
//! <param>value</param>
//! </toolName>
//! ```
//!
//! Tag names are case-sensitive. Only the first well-formed block of a
//! registered tool is recognized; anything after it is left to the caller.

use once_cell::sync::Lazy;
use regex::Regex;

use super::registry::ToolRegistry;
use super::types::{ToolInvocation, ToolName};
use crate::config::constants::tool_params;

#[allow(clippy::expect_used)]
static ANY_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[A-Za-z_][A-Za-z0-9_]*\s*/?>").expect("valid tag regex"));

#[allow(clippy::expect_used)]
static OPEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z_][A-Za-z0-9_]*)>").expect("valid open tag regex"));

#[allow(clippy::expect_used)]
static LEADING_CLOSE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*</[A-Za-z_][A-Za-z0-9_]*\s*>").expect("valid close tag regex"));

/// Text on either side of the matched block, both trimmed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitText {
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockMatch<'a> {
    name: &'a str,
    start: usize,
    inner_start: usize,
    inner_end: usize,
    end: usize,
}

#[derive(Debug, Clone)]
pub struct ToolUseParser {
    tool_names: Vec<String>,
}

impl ToolUseParser {
    pub fn new<I, S>(tool_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tool_names: tool_names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_registry(registry: &ToolRegistry) -> Self {
        Self::new(registry.tool_names())
    }

    /// First well-formed invocation of a registered tool, if any
    pub fn parse(&self, text: &str) -> Option<ToolInvocation> {
        let block = self.find_block(text)?;
        let inner = &text[block.inner_start..block.inner_end];

        let invocation = match ToolName::from_name(block.name) {
            Some(ToolName::Command) => extract_command(block.name, inner),
            Some(ToolName::WebSearch) => extract_web_search(block.name, inner),
            None => extract_generic(block.name, inner),
        };
        Some(invocation)
    }

    /// Whether `parse` would find an invocation, without extracting parameters
    pub fn contains_tool_invocation(&self, text: &str) -> bool {
        self.find_block(text).is_some()
    }

    /// Split `text` around the matched block. Without a match the whole
    /// input is `before`.
    pub fn split_around_invocation(&self, text: &str) -> SplitText {
        let Some(block) = self.find_block(text) else {
            return SplitText {
                before: text.to_string(),
                after: String::new(),
            };
        };

        let mut after = &text[block.end..];
        while let Some(stray) = LEADING_CLOSE_TAG.find(after) {
            after = &after[stray.end()..];
        }

        SplitText {
            before: text[..block.start].trim().to_string(),
            after: after.trim().to_string(),
        }
    }

    fn find_block<'a>(&'a self, text: &str) -> Option<BlockMatch<'a>> {
        self.tool_names
            .iter()
            .filter_map(|name| find_balanced_block(text, name))
            .min_by_key(|block| block.start)
    }
}

/// Earliest `<name>...</name>` whose nesting of `name` balances and whose
/// content is not blank.
fn find_balanced_block<'a>(text: &str, name: &'a str) -> Option<BlockMatch<'a>> {
    let open = format!("<{}>", name);
    let close = format!("</{}>", name);

    let mut search_from = 0usize;
    while let Some(offset) = text[search_from..].find(&open) {
        let start = search_from + offset;
        let inner_start = start + open.len();

        if let Some(inner_end) = matching_close(text, inner_start, &open, &close) {
            if !text[inner_start..inner_end].trim().is_empty() {
                return Some(BlockMatch {
                    name,
                    start,
                    inner_start,
                    inner_end,
                    end: inner_end + close.len(),
                });
            }
        }
        search_from = inner_start;
    }
    None
}

/// Byte offset of the close tag balancing an open tag that ended at `from`
fn matching_close(text: &str, from: usize, open: &str, close: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut cursor = from;
    loop {
        let rest = &text[cursor..];
        let next_close = rest.find(close)?;
        match rest.find(open) {
            Some(next_open) if next_open < next_close => {
                depth += 1;
                cursor += next_open + open.len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(cursor + next_close);
                }
                cursor += next_close + close.len();
            }
        }
    }
}

/// Content of the first `<tag>...</tag>` pair
fn tag_content<'t>(text: &'t str, tag: &str) -> Option<&'t str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = text.find(&open)? + open.len();
    let len = text[start..].find(&close)?;
    Some(&text[start..start + len])
}

fn strip_tags(text: &str) -> String {
    ANY_TAG.replace_all(text, "").trim().to_string()
}

fn extract_command(name: &str, inner: &str) -> ToolInvocation {
    let mut invocation = ToolInvocation::new(name);

    let cwd = tag_content(inner, tool_params::CWD)
        .map(str::trim)
        .filter(|cwd| !cwd.is_empty())
        .map(str::to_string);

    let without_cwd = match tag_content(inner, tool_params::CWD) {
        Some(cwd_raw) => inner.replacen(
            &format!("<{0}>{1}</{0}>", tool_params::CWD, cwd_raw),
            "",
            1,
        ),
        None => inner.to_string(),
    };

    let command = innermost_command(&without_cwd)
        .map(|command| command.trim().to_string())
        .filter(|command| !command.is_empty())
        .unwrap_or_else(|| strip_tags(&without_cwd));

    if !command.is_empty() {
        invocation
            .params
            .insert(tool_params::COMMAND.to_string(), command);
    }
    if let Some(cwd) = cwd {
        invocation.params.insert(tool_params::CWD.to_string(), cwd);
    }
    invocation
}

/// Innermost `<command>` value: the content between the first closing tag
/// and the last opening tag before it.
fn innermost_command(text: &str) -> Option<&str> {
    let open = format!("<{}>", tool_params::COMMAND);
    let close = format!("</{}>", tool_params::COMMAND);
    let close_at = text.find(&close)?;
    let open_at = text[..close_at].rfind(&open)?;
    Some(&text[open_at + open.len()..close_at])
}

fn extract_web_search(name: &str, inner: &str) -> ToolInvocation {
    let mut invocation = ToolInvocation::new(name);
    for key in [tool_params::QUERY, tool_params::LIMIT] {
        if let Some(value) = tag_content(inner, key) {
            let value = value.trim();
            if !value.is_empty() {
                invocation.params.insert(key.to_string(), value.to_string());
            }
        }
    }
    invocation
}

fn extract_generic(name: &str, inner: &str) -> ToolInvocation {
    let mut invocation = ToolInvocation::new(name);
    let mut cursor = 0usize;
    while let Some(captures) = OPEN_TAG.captures(&inner[cursor..]) {
        let (Some(whole), Some(tag)) = (captures.get(0), captures.get(1)) else {
            break;
        };
        let value_start = cursor + whole.end();
        let close = format!("</{}>", tag.as_str());
        match inner[value_start..].find(&close) {
            Some(len) => {
                let value = inner[value_start..value_start + len].trim().to_string();
                invocation
                    .params
                    .entry(tag.as_str().to_string())
                    .or_insert(value);
                cursor = value_start + len + close.len();
            }
            None => cursor = value_start,
        }
    }
    invocation
}
