//! Endpoint normalization for hosted MCP servers
//!
//! Pure pre-flight validation: a configured URL string either becomes a
//! canonical [`McpEndpoint`] or a descriptive validation failure. The
//! connection path never proceeds to lookup, scale, or connect with an
//! endpoint that did not pass through here.

use std::fmt;

use url::Url;

use crate::error::McpConnectError;

/// A validated, canonical MCP server endpoint
///
/// Only constructed by [`normalize_mcp_url`]; never from a raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpEndpoint {
    url: Url,
}

impl McpEndpoint {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for McpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.url.fmt(f)
    }
}

/// Validate and canonicalize a configured MCP server URL
///
/// Rejects empty values, malformed URLs, non-HTTP(S) schemes, and URLs
/// without a host. Deterministic: normalizing an already-normalized URL
/// yields an equal endpoint.
pub fn normalize_mcp_url(raw: &str) -> Result<McpEndpoint, McpConnectError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(McpConnectError::Validation(
            "MCP server URL not found in integration configuration".to_string(),
        ));
    }

    let url = Url::parse(trimmed).map_err(|e| {
        McpConnectError::Validation(format!("Invalid MCP server URL '{}': {}", trimmed, e))
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(McpConnectError::Validation(format!(
                "Unsupported MCP server URL scheme '{}' (expected http or https)",
                scheme
            )));
        }
    }

    if url.host_str().is_none() {
        return Err(McpConnectError::Validation(format!(
            "MCP server URL '{}' has no host",
            trimmed
        )));
    }

    Ok(McpEndpoint { url })
}
