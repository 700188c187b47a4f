use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A hosted MCP server record.
///
/// Read from the directory; the connection path never mutates it directly,
/// only requests changes through the scale controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServer {
    /// Unique identifier
    pub id: Uuid,

    /// Workspace (tenant) this server belongs to
    pub workspace_id: Uuid,

    /// Display name
    pub name: String,

    /// Current replica count. Zero means the server is cold.
    pub replicas: u32,

    /// Endpoint the server is reachable at once running
    pub endpoint: String,

    /// When a client last connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl McpServer {
    /// Whether the server currently has no running replicas
    pub fn is_cold(&self) -> bool {
        self.replicas == 0
    }
}
