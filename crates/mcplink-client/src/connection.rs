//! Scale-aware connection establishment for hosted MCP integrations
//!
//! Composes directory lookup, cold-start detection, scale-up, retrying
//! connect, and post-connect bookkeeping into one client-acquisition call
//! with partial-failure semantics:
//!
//! - validation, lookup, and scale failures are fail-fast (no connect
//!   attempt is made);
//! - connect failures are returned only once the retry budget is exhausted;
//! - wake notifications and usage recording are best-effort side channels
//!   that never revert an established connection.

use std::sync::Arc;
use std::time::Duration;

use mcplink_core::{
    DomainEvent, EventSender, Integration, MaintenanceQueue, McpServer, McpServerRepository,
    ScaleController, UPDATE_MCP_SERVER_LAST_USED_JOB,
};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::endpoint::normalize_mcp_url;
use crate::error::McpConnectError;
use crate::observer::WakeObserver;
use crate::retry::{retry_with_backoff, RetryConfig};
use crate::transport::McpTransport;

/// Extended first-attempt timeout applied after a scale-up, to tolerate
/// cold-start boot latency
pub const STARTUP_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Outcome of the scale-resolution step
enum ScaleOutcome {
    /// Integration has no associated server; nothing to scale
    NoServer,
    /// Server already had running replicas; no scale request issued
    AlreadyWarm(McpServer),
    /// Server was cold and a scale-up to one replica was accepted
    ScaledUp(McpServer),
}

impl ScaleOutcome {
    fn woke(&self) -> bool {
        matches!(self, Self::ScaledUp(_))
    }

    fn into_server(self) -> Option<McpServer> {
        match self {
            Self::NoServer => None,
            Self::AlreadyWarm(server) | Self::ScaledUp(server) => Some(server),
        }
    }
}

/// A live hosted MCP connection
///
/// Owned exclusively by the caller after return, including shutting the
/// session down.
#[derive(Debug)]
pub struct HostedConnection<S> {
    /// The live client session
    pub session: S,

    /// Server record resolved during connection, if the integration had one
    pub server: Option<McpServer>,

    /// Whether this connection woke a cold server
    pub woke_server: bool,

    /// Set when the last-used bookkeeping job could not be enqueued.
    /// The session is still valid; see [`McpConnectError::Bookkeeping`].
    pub bookkeeping_error: Option<McpConnectError>,
}

/// Connection orchestrator for hosted MCP integrations
///
/// Single pass per call, no state persisted across calls. Concurrent calls
/// for the same integration are not deduplicated: each may independently
/// detect a cold server and request a wake, which is why
/// [`ScaleController::set_replicas`] must be idempotent.
pub struct HostedMcpConnector<T: McpTransport> {
    servers: Arc<dyn McpServerRepository>,
    scaler: Arc<dyn ScaleController>,
    maintenance_queue: Arc<dyn MaintenanceQueue>,
    events: EventSender,
    transport: T,
    retry_config: RetryConfig,
}

impl<T: McpTransport> HostedMcpConnector<T> {
    pub fn new(
        servers: Arc<dyn McpServerRepository>,
        scaler: Arc<dyn ScaleController>,
        maintenance_queue: Arc<dyn MaintenanceQueue>,
        events: EventSender,
        transport: T,
    ) -> Self {
        Self {
            servers,
            scaler,
            maintenance_queue,
            events,
            transport,
            retry_config: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Acquire a live connection for a hosted MCP integration
    ///
    /// Waking a cold server extends the first connect attempt's timeout to
    /// the grace period; a warm path keeps the default timeout so failures
    /// stay fast.
    pub async fn connect(
        &self,
        integration: &Integration,
        observer: Option<&dyn WakeObserver>,
    ) -> Result<HostedConnection<T::Session>, McpConnectError> {
        self.connect_with_config(integration, observer, &self.retry_config)
            .await
    }

    /// Same as [`connect`](Self::connect) with a per-call retry schedule
    pub async fn connect_with_config(
        &self,
        integration: &Integration,
        observer: Option<&dyn WakeObserver>,
        retry: &RetryConfig,
    ) -> Result<HostedConnection<T::Session>, McpConnectError> {
        if !integration.is_hosted_mcp() {
            return Err(McpConnectError::Validation(format!(
                "Integration type {} is not supported for hosted MCP client",
                integration.kind
            )));
        }

        let configured_url = integration.configuration.url.as_deref().unwrap_or_default();
        let endpoint = normalize_mcp_url(configured_url)?;

        let scale = self.ensure_server_scaled(integration, observer).await?;
        let woke = scale.woke();

        // The grace period applies only when a scale-up just happened;
        // warm servers keep the short default so failures stay fast.
        let retry = RetryConfig {
            startup_timeout: woke.then(|| retry.startup_timeout.unwrap_or(STARTUP_GRACE_PERIOD)),
            ..retry.clone()
        };

        info!(
            integration = %integration.name,
            endpoint = %endpoint,
            woke_server = woke,
            "[HostedMcpConnector] Connecting"
        );

        let transport = &self.transport;
        let session = retry_with_backoff(&retry, |attempt| {
            let endpoint = endpoint.clone();
            async move {
                debug!(attempt, endpoint = %endpoint, "[HostedMcpConnector] Connect attempt");
                transport.connect(&endpoint).await
            }
        })
        .await
        .map_err(|e| McpConnectError::Connect(format!("{e:#}")))?;

        if let ScaleOutcome::ScaledUp(server) = &scale {
            // Fire-and-forget: tells subscribers the woken server is reachable
            self.events.emit(DomainEvent::McpServerConnected {
                workspace_id: server.workspace_id,
                mcp_server_id: server.id,
            });
        }

        let server = scale.into_server();
        let bookkeeping_error = match &server {
            Some(server) => self.record_last_used(server).await.err(),
            None => None,
        };

        Ok(HostedConnection {
            session,
            server,
            woke_server: woke,
            bookkeeping_error,
        })
    }

    /// Detect a cold server and request exactly one scale-up to one replica
    ///
    /// A failed scale-up is a hard stop: no connect attempt follows.
    async fn ensure_server_scaled(
        &self,
        integration: &Integration,
        observer: Option<&dyn WakeObserver>,
    ) -> Result<ScaleOutcome, McpConnectError> {
        let Some(server_id) = integration.mcp_server_id else {
            return Ok(ScaleOutcome::NoServer);
        };

        let server = match self
            .servers
            .find(&integration.workspace_id, &server_id)
            .await
        {
            Ok(Some(server)) => server,
            Ok(None) => {
                return Err(McpConnectError::Lookup(format!(
                    "MCP server {} not found in workspace {}",
                    server_id, integration.workspace_id
                )));
            }
            Err(e) => return Err(McpConnectError::Lookup(format!("{e:#}"))),
        };

        if !server.is_cold() {
            debug!(
                server_id = %server.id,
                replicas = server.replicas,
                "[HostedMcpConnector] Server already warm"
            );
            return Ok(ScaleOutcome::AlreadyWarm(server));
        }

        info!(
            server_id = %server.id,
            integration = %integration.name,
            "[HostedMcpConnector] Cold server detected, requesting wake"
        );
        if let Some(observer) = observer {
            observer.wake_in_progress(integration);
        }
        self.events.emit(DomainEvent::McpServerWaking {
            workspace_id: server.workspace_id,
            mcp_server_id: server.id,
            integration_name: integration.name.clone(),
        });

        match self.scaler.set_replicas(&server, 1).await {
            Ok(scaled) => {
                self.events.emit(DomainEvent::McpServerScaled {
                    workspace_id: scaled.workspace_id,
                    mcp_server_id: scaled.id,
                    replicas: scaled.replicas,
                });
                Ok(ScaleOutcome::ScaledUp(scaled))
            }
            Err(e) => {
                warn!(
                    server_id = %server.id,
                    error = %e,
                    "[HostedMcpConnector] Scale-up request failed"
                );
                if let Some(observer) = observer {
                    observer.wake_failed(
                        integration,
                        &format!(
                            "Failed to scale up integration: {}. Please try again or contact support.",
                            integration.name
                        ),
                    );
                }
                Err(McpConnectError::Scale(format!("{e:#}")))
            }
        }
    }

    /// Enqueue the best-effort last-used timestamp update
    async fn record_last_used(&self, server: &McpServer) -> Result<(), McpConnectError> {
        let payload = json!({
            "workspace_id": server.workspace_id,
            "mcp_server_id": server.id,
        });

        self.maintenance_queue
            .enqueue(UPDATE_MCP_SERVER_LAST_USED_JOB, payload)
            .await
            .map_err(|e| {
                warn!(
                    server_id = %server.id,
                    error = %e,
                    "[HostedMcpConnector] Failed to enqueue last-used update"
                );
                McpConnectError::Bookkeeping(format!("{e:#}"))
            })
    }
}
