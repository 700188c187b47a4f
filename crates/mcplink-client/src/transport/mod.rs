//! Transport abstraction for MCP connections
//!
//! Provides a transport trait and the streamable HTTP implementation.
//! Alternate transports (and test doubles) implement the same trait.

mod http;

use async_trait::async_trait;

use crate::endpoint::McpEndpoint;

pub use http::{McpClientHandler, McpSession, StreamableHttpTransport};

/// A way of establishing one MCP session against an endpoint
///
/// No implicit retry: each call makes exactly one attempt with a fresh
/// underlying transport, since a half-established transport cannot be
/// safely reused after a failed attempt. Per-attempt timeouts are enforced
/// by the retry engine around `connect`.
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// The live session type handed to the caller on success
    type Session: Send;

    /// Establish one session; no implicit retry
    async fn connect(&self, endpoint: &McpEndpoint) -> anyhow::Result<Self::Session>;
}
