//! Core domain entities

mod event;
mod integration;
mod mcp_server;

pub use event::DomainEvent;
pub use integration::{Integration, IntegrationConfiguration, IntegrationKind};
pub use mcp_server::McpServer;
