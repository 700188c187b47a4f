//! Streamable HTTP transport for hosted MCP servers
//!
//! Connects to a hosted server over RMCP's streamable HTTP client
//! transport and performs the MCP handshake.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rmcp::model::{ClientCapabilities, ClientInfo, Implementation};
use rmcp::service::RunningService;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::{RoleClient, ServiceExt};
use tracing::{debug, info};

use super::McpTransport;
use crate::endpoint::McpEndpoint;

/// Type alias for the live MCP client session
pub type McpSession = RunningService<RoleClient, McpClientHandler>;

/// Client handler identifying McpLink to the remote server
#[derive(Clone)]
pub struct McpClientHandler {
    info: ClientInfo,
}

impl McpClientHandler {
    pub fn new(client_name: &str) -> Self {
        Self {
            info: ClientInfo {
                protocol_version: Default::default(),
                capabilities: ClientCapabilities::default(),
                client_info: Implementation {
                    name: client_name.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    ..Default::default()
                },
                meta: None,
            },
        }
    }
}

impl rmcp::ClientHandler for McpClientHandler {
    fn get_info(&self) -> ClientInfo {
        self.info.clone()
    }
}

/// Streamable HTTP transport for hosted MCP servers
///
/// Reuses one `reqwest::Client` (connection pooling) but builds a fresh
/// RMCP transport per `connect` call.
pub struct StreamableHttpTransport {
    client_name: String,
    http_client: reqwest::Client,
}

impl StreamableHttpTransport {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            http_client: reqwest::Client::default(),
        }
    }
}

#[async_trait]
impl McpTransport for StreamableHttpTransport {
    type Session = McpSession;

    async fn connect(&self, endpoint: &McpEndpoint) -> Result<Self::Session> {
        debug!(endpoint = %endpoint, "[StreamableHttpTransport] Connecting");

        let transport_config = StreamableHttpClientTransportConfig::with_uri(endpoint.as_str());
        let transport =
            StreamableHttpClientTransport::with_client(self.http_client.clone(), transport_config);

        let handler = McpClientHandler::new(&self.client_name);
        let session = handler
            .serve(transport)
            .await
            .with_context(|| format!("MCP handshake with {} failed", endpoint))?;

        info!(endpoint = %endpoint, "[StreamableHttpTransport] MCP server connected");
        Ok(session)
    }
}
