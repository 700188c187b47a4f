//! Typed failures for the hosted MCP connection path
//!
//! Callers branch on the variant before deciding how to react; every
//! variant carries a human-readable message.

use thiserror::Error;

/// Failure kinds produced while acquiring a hosted MCP connection
#[derive(Debug, Error)]
pub enum McpConnectError {
    /// Unsupported integration kind, or missing/malformed endpoint configuration
    #[error("{0}")]
    Validation(String),

    /// Associated server record not found, or storage error during lookup
    #[error("Failed to find MCP server: {0}")]
    Lookup(String),

    /// Scale-up request rejected or errored; no connect attempt was made
    #[error("Failed to scale up MCP server: {0}")]
    Scale(String),

    /// All retry attempts exhausted without a successful transport session
    #[error("Failed to connect to MCP server: {0}")]
    Connect(String),

    /// Usage-recording job could not be enqueued. Non-fatal: the session
    /// was already established and is still handed back to the caller.
    #[error("Failed to update MCP server last used: {0}")]
    Bookkeeping(String),
}

impl McpConnectError {
    /// Stable short name for the failure kind, used in structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Lookup(_) => "lookup",
            Self::Scale(_) => "scale",
            Self::Connect(_) => "connect",
            Self::Bookkeeping(_) => "bookkeeping",
        }
    }
}
