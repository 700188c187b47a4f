//! Domain Events - Unified event system for McpLink
//!
//! All domain changes on the hosted MCP connection path are represented as
//! events in this module. Events are emitted by the connection subsystem and
//! consumed by whoever subscribes to the bus (UI bridges, audit logging).
//!
//! # Design Principles
//!
//! - **Single Source of Truth**: One enum for all domain events
//! - **Immutable**: Events are facts that happened, never mutated
//! - **Serializable**: All events can be serialized for transport/storage
//!
//! # Serialization
//!
//! Events serialize with a `type` field containing the snake_case variant name:
//! ```json
//! { "type": "mcp_server_connected", "workspace_id": "...", "mcp_server_id": "..." }
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain events for the hosted MCP connection lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A cold server was detected and a wake was requested
    McpServerWaking {
        workspace_id: Uuid,
        mcp_server_id: Uuid,
        integration_name: String,
    },

    /// A wake request was accepted and the replica count changed
    McpServerScaled {
        workspace_id: Uuid,
        mcp_server_id: Uuid,
        replicas: u32,
    },

    /// A server that was just woken is now reachable
    McpServerConnected {
        workspace_id: Uuid,
        mcp_server_id: Uuid,
    },
}

impl DomainEvent {
    /// Snake_case name of the variant, matching the serialized `type` tag
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::McpServerWaking { .. } => "mcp_server_waking",
            Self::McpServerScaled { .. } => "mcp_server_scaled",
            Self::McpServerConnected { .. } => "mcp_server_connected",
        }
    }

    /// Workspace the event belongs to
    pub fn workspace_id(&self) -> Uuid {
        match self {
            Self::McpServerWaking { workspace_id, .. }
            | Self::McpServerScaled { workspace_id, .. }
            | Self::McpServerConnected { workspace_id, .. } => *workspace_id,
        }
    }

    /// Server the event refers to
    pub fn mcp_server_id(&self) -> Uuid {
        match self {
            Self::McpServerWaking { mcp_server_id, .. }
            | Self::McpServerScaled { mcp_server_id, .. }
            | Self::McpServerConnected { mcp_server_id, .. } => *mcp_server_id,
        }
    }
}
