//! # McpLink Client Library
//!
//! Scale-aware connection establishment for hosted MCP tool servers.
//!
//! Hosted servers are elastically scaled and may be cold (zero replicas)
//! when a workspace needs them. [`HostedMcpConnector`] composes directory
//! lookup, cold-start detection, scale-up, retrying connect, and
//! post-connect bookkeeping into a single client-acquisition call.
//!
//! ## Modules
//!
//! - `endpoint` - URL validation and canonicalization
//! - `retry` - Bounded retry with backoff and cold-start grace period
//! - `transport` - MCP transport abstraction and streamable HTTP implementation
//! - `observer` - Wake progress hooks for UI-facing callers
//! - `connection` - The connection orchestrator

pub mod connection;
pub mod endpoint;
pub mod error;
pub mod observer;
pub mod retry;
pub mod transport;

pub use connection::{HostedConnection, HostedMcpConnector, STARTUP_GRACE_PERIOD};
pub use endpoint::{normalize_mcp_url, McpEndpoint};
pub use error::McpConnectError;
pub use observer::WakeObserver;
pub use retry::{retry_with_backoff, RetryConfig};
pub use transport::{McpSession, McpTransport, StreamableHttpTransport};
