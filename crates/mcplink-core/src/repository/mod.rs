//! Collaborator traits for data access and control-plane adapters
//!
//! These traits define the interfaces the connection subsystem depends on
//! without specifying the implementation (Postgres, control-plane API,
//! Redis-backed queue, in-memory test doubles).

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::McpServer;

/// Result type for collaborator operations
pub type RepoResult<T> = anyhow::Result<T>;

/// Job name for the best-effort last-used timestamp update
pub const UPDATE_MCP_SERVER_LAST_USED_JOB: &str = "update_mcp_server_last_used";

/// Directory of hosted MCP server records, scoped by workspace
#[async_trait]
pub trait McpServerRepository: Send + Sync {
    /// Look up a server record by id within a workspace
    async fn find(&self, workspace_id: &Uuid, id: &Uuid) -> RepoResult<Option<McpServer>>;
}

/// Control-plane adapter that changes a server's replica count
#[async_trait]
pub trait ScaleController: Send + Sync {
    /// Request a target replica count for a server
    ///
    /// Must be safe to call redundantly with the same target; concurrent
    /// wake-ups are not deduplicated by callers.
    async fn set_replicas(&self, server: &McpServer, replicas: u32) -> RepoResult<McpServer>;
}

/// Background job queue for fire-and-forget bookkeeping
#[async_trait]
pub trait MaintenanceQueue: Send + Sync {
    /// Enqueue a named job with a JSON payload
    async fn enqueue(&self, job_name: &str, payload: serde_json::Value) -> RepoResult<()>;
}
