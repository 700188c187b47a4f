use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An integration configured by a workspace.
///
/// Immutable input to the connection path; owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integration {
    /// Unique identifier
    pub id: Uuid,

    /// Workspace (tenant) this integration belongs to
    pub workspace_id: Uuid,

    /// What kind of integration this is
    pub kind: IntegrationKind,

    /// Display name
    pub name: String,

    /// Associated hosted MCP server, if this workspace owns one
    pub mcp_server_id: Option<Uuid>,

    /// Connection configuration
    #[serde(default)]
    pub configuration: IntegrationConfiguration,
}

impl Integration {
    pub fn is_hosted_mcp(&self) -> bool {
        matches!(self.kind, IntegrationKind::HostedMcp)
    }
}

/// Connection configuration payload for an integration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationConfiguration {
    /// MCP server URL
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationKind {
    /// A tool server we host and elastically scale for the workspace
    HostedMcp,
    /// A tool server hosted elsewhere, connected to directly
    ExternalMcp,
    /// A custom (non-MCP) integration
    Custom,
}

impl IntegrationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HostedMcp => "hosted_mcp",
            Self::ExternalMcp => "external_mcp",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
