//! End-to-end tests for the hosted MCP connection orchestrator
//!
//! All collaborators are in-memory mocks; tokio's paused clock makes the
//! backoff and timeout schedules deterministic.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use uuid::Uuid;

use mcplink_client::{
    HostedMcpConnector, McpConnectError, RetryConfig, STARTUP_GRACE_PERIOD,
};
use mcplink_core::{EventBus, IntegrationKind, UPDATE_MCP_SERVER_LAST_USED_JOB};

use tests::mocks::{
    FakeSession, MockMaintenanceQueue, MockMcpServerRepository, MockScaleController,
    MockTransport, RecordingWakeObserver, TransportBehavior,
};
use tests::{hosted_integration, mcp_server};

/// Everything a test needs to drive one connector and assert side effects
struct Harness {
    repo: Arc<MockMcpServerRepository>,
    scaler: Arc<MockScaleController>,
    queue: Arc<MockMaintenanceQueue>,
    transport: MockTransport,
    bus: EventBus,
    connector: HostedMcpConnector<MockTransport>,
}

fn harness(
    repo: MockMcpServerRepository,
    scaler: MockScaleController,
    queue: MockMaintenanceQueue,
    behavior: TransportBehavior,
) -> Harness {
    let repo = Arc::new(repo);
    let scaler = Arc::new(scaler);
    let queue = Arc::new(queue);
    let transport = MockTransport::new(behavior);
    let bus = EventBus::new();

    let connector = HostedMcpConnector::new(
        repo.clone(),
        scaler.clone(),
        queue.clone(),
        bus.sender(),
        transport.clone(),
    )
    .with_retry_config(fast_retry(3));

    Harness {
        repo,
        scaler,
        queue,
        transport,
        bus,
        connector,
    }
}

fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_delay: Duration::from_millis(10),
        backoff_factor: 2.0,
        max_delay: Duration::from_secs(1),
        attempt_timeout: Duration::from_secs(5),
        startup_timeout: None,
    }
}

// ============================================================================
// Validation gate
// ============================================================================

#[tokio::test(start_paused = true)]
async fn rejects_unsupported_integration_kind() {
    let h = harness(
        MockMcpServerRepository::new(),
        MockScaleController::new(),
        MockMaintenanceQueue::new(),
        TransportBehavior::SucceedAfter(0),
    );
    let mut integration = hosted_integration(Uuid::new_v4(), None);
    integration.kind = IntegrationKind::Custom;

    let err = h.connector.connect(&integration, None).await.unwrap_err();

    assert!(matches!(err, McpConnectError::Validation(_)));
    assert!(err.to_string().contains("custom"));
    // No side effects of any kind
    assert_eq!(h.repo.find_calls(), 0);
    assert!(h.scaler.calls().is_empty());
    assert_eq!(h.transport.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn rejects_missing_url_before_any_lookup() {
    let h = harness(
        MockMcpServerRepository::new(),
        MockScaleController::new(),
        MockMaintenanceQueue::new(),
        TransportBehavior::SucceedAfter(0),
    );
    let mut integration = hosted_integration(Uuid::new_v4(), Some(Uuid::new_v4()));
    integration.configuration.url = None;

    let err = h.connector.connect(&integration, None).await.unwrap_err();

    assert!(matches!(err, McpConnectError::Validation(_)));
    assert_eq!(h.repo.find_calls(), 0);
    assert_eq!(h.transport.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn rejects_malformed_url_before_any_lookup() {
    let h = harness(
        MockMcpServerRepository::new(),
        MockScaleController::new(),
        MockMaintenanceQueue::new(),
        TransportBehavior::SucceedAfter(0),
    );
    let mut integration = hosted_integration(Uuid::new_v4(), Some(Uuid::new_v4()));
    integration.configuration.url = Some("not a url".to_string());

    let err = h.connector.connect(&integration, None).await.unwrap_err();

    assert!(matches!(err, McpConnectError::Validation(_)));
    assert_eq!(h.repo.find_calls(), 0);
    assert_eq!(h.transport.attempts(), 0);
}

// ============================================================================
// Scale resolution
// ============================================================================

#[tokio::test(start_paused = true)]
async fn no_server_id_skips_scaling_and_bookkeeping() {
    let h = harness(
        MockMcpServerRepository::new(),
        MockScaleController::new(),
        MockMaintenanceQueue::new(),
        TransportBehavior::SucceedAfter(0),
    );
    let observer = RecordingWakeObserver::new();
    let integration = hosted_integration(Uuid::new_v4(), None);

    let conn = h
        .connector
        .connect(&integration, Some(&observer))
        .await
        .unwrap();

    assert!(h.scaler.calls().is_empty());
    assert!(observer.waking().is_empty());
    assert!(conn.server.is_none());
    assert!(!conn.woke_server);
    // Usage recording is keyed by server id; nothing to record here
    assert!(h.queue.jobs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn lookup_not_found_fails_before_connect() {
    let workspace_id = Uuid::new_v4();
    let h = harness(
        MockMcpServerRepository::new(),
        MockScaleController::new(),
        MockMaintenanceQueue::new(),
        TransportBehavior::SucceedAfter(0),
    );
    let integration = hosted_integration(workspace_id, Some(Uuid::new_v4()));

    let err = h.connector.connect(&integration, None).await.unwrap_err();

    assert!(matches!(err, McpConnectError::Lookup(_)));
    assert_eq!(h.repo.find_calls(), 1);
    assert_eq!(h.transport.attempts(), 0);
    assert!(h.scaler.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn lookup_storage_error_fails_before_connect() {
    let h = harness(
        MockMcpServerRepository::failing(),
        MockScaleController::new(),
        MockMaintenanceQueue::new(),
        TransportBehavior::SucceedAfter(0),
    );
    let integration = hosted_integration(Uuid::new_v4(), Some(Uuid::new_v4()));

    let err = h.connector.connect(&integration, None).await.unwrap_err();

    assert!(matches!(err, McpConnectError::Lookup(_)));
    assert!(err.to_string().contains("storage unavailable"));
    assert_eq!(h.transport.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn scale_failure_is_a_hard_stop() {
    let workspace_id = Uuid::new_v4();
    let server_id = Uuid::new_v4();
    let h = harness(
        MockMcpServerRepository::new().with_server(mcp_server(server_id, workspace_id, 0)),
        MockScaleController::failing(),
        MockMaintenanceQueue::new(),
        TransportBehavior::SucceedAfter(0),
    );
    let observer = RecordingWakeObserver::new();
    let integration = hosted_integration(workspace_id, Some(server_id));

    let err = h
        .connector
        .connect(&integration, Some(&observer))
        .await
        .unwrap_err();

    assert!(matches!(err, McpConnectError::Scale(_)));
    // Wake was announced, then the failure was reported with the name
    assert_eq!(observer.waking(), vec!["Notion".to_string()]);
    let failures = observer.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("Notion"));
    // The hard stop: no connect attempt, no bookkeeping
    assert_eq!(h.transport.attempts(), 0);
    assert!(h.queue.jobs().is_empty());
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

/// Scenario A: cold server, successful wake, connect on first attempt
#[tokio::test(start_paused = true)]
async fn cold_server_wakes_and_connects() {
    let workspace_id = Uuid::new_v4();
    let server_id = Uuid::new_v4();
    let h = harness(
        MockMcpServerRepository::new().with_server(mcp_server(server_id, workspace_id, 0)),
        MockScaleController::new(),
        MockMaintenanceQueue::new(),
        TransportBehavior::SucceedAfter(0),
    );
    let observer = RecordingWakeObserver::new();
    let mut events = h.bus.subscribe();
    let integration = hosted_integration(workspace_id, Some(server_id));

    let conn = h
        .connector
        .connect(&integration, Some(&observer))
        .await
        .unwrap();

    assert_eq!(conn.session, FakeSession { attempt: 1 });
    assert!(conn.woke_server);
    assert_eq!(conn.server.as_ref().map(|s| s.replicas), Some(1));
    assert!(conn.bookkeeping_error.is_none());

    // Exactly one wake notification and one set_replicas(1)
    assert_eq!(observer.waking(), vec!["Notion".to_string()]);
    assert!(observer.failures().is_empty());
    assert_eq!(h.scaler.calls(), vec![(server_id, 1)]);

    // Event bus saw the full wake lifecycle, in order
    let waking = events.recv().await.unwrap();
    assert_eq!(waking.type_name(), "mcp_server_waking");
    let scaled = events.recv().await.unwrap();
    assert_eq!(scaled.type_name(), "mcp_server_scaled");
    let connected = events.recv().await.unwrap();
    assert_eq!(connected.type_name(), "mcp_server_connected");
    assert_eq!(connected.mcp_server_id(), server_id);
    assert!(events.try_recv().is_none());

    // One usage-record job with the right payload
    let jobs = h.queue.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].0, UPDATE_MCP_SERVER_LAST_USED_JOB);
    assert_eq!(jobs[0].1["workspace_id"], workspace_id.to_string());
    assert_eq!(jobs[0].1["mcp_server_id"], server_id.to_string());
}

/// Scenario B: warm server, connect succeeds on the third attempt
#[tokio::test(start_paused = true)]
async fn warm_server_connects_without_scaling() {
    let workspace_id = Uuid::new_v4();
    let server_id = Uuid::new_v4();
    let h = harness(
        MockMcpServerRepository::new().with_server(mcp_server(server_id, workspace_id, 2)),
        MockScaleController::new(),
        MockMaintenanceQueue::new(),
        TransportBehavior::SucceedAfter(2),
    );
    let observer = RecordingWakeObserver::new();
    let mut events = h.bus.subscribe();
    let integration = hosted_integration(workspace_id, Some(server_id));

    let conn = h
        .connector
        .connect(&integration, Some(&observer))
        .await
        .unwrap();

    assert_eq!(conn.session, FakeSession { attempt: 3 });
    assert!(!conn.woke_server);
    assert_eq!(h.transport.attempts(), 3);

    // No wake anywhere: observer, scaler, or bus
    assert!(observer.waking().is_empty());
    assert!(h.scaler.calls().is_empty());
    assert!(events.try_recv().is_none());

    // Usage still recorded
    assert_eq!(h.queue.jobs().len(), 1);
}

/// Scenario C: no associated server, connect fails on all attempts
#[tokio::test(start_paused = true)]
async fn connect_failure_after_exhausted_retries() {
    let h = harness(
        MockMcpServerRepository::new(),
        MockScaleController::new(),
        MockMaintenanceQueue::new(),
        TransportBehavior::AlwaysFail,
    );
    let integration = hosted_integration(Uuid::new_v4(), None);

    let err = h.connector.connect(&integration, None).await.unwrap_err();

    assert!(matches!(err, McpConnectError::Connect(_)));
    assert!(err.to_string().contains("all 3 connection attempts failed"));
    assert!(err.to_string().contains("connection refused"));
    assert_eq!(h.transport.attempts(), 3);
    assert!(h.scaler.calls().is_empty());
    assert!(h.queue.jobs().is_empty());
}

// ============================================================================
// Grace period
// ============================================================================

#[tokio::test(start_paused = true)]
async fn grace_period_applies_only_after_a_wake() {
    let workspace_id = Uuid::new_v4();
    let server_id = Uuid::new_v4();

    // Cold server: first (only) attempt gets the 10s grace budget
    let h = harness(
        MockMcpServerRepository::new().with_server(mcp_server(server_id, workspace_id, 0)),
        MockScaleController::new(),
        MockMaintenanceQueue::new(),
        TransportBehavior::Hang,
    );
    let integration = hosted_integration(workspace_id, Some(server_id));
    let started = tokio::time::Instant::now();
    let err = h
        .connector
        .connect_with_config(&integration, None, &fast_retry(1))
        .await
        .unwrap_err();
    assert!(matches!(err, McpConnectError::Connect(_)));
    let elapsed = started.elapsed();
    assert!(
        elapsed >= STARTUP_GRACE_PERIOD && elapsed < STARTUP_GRACE_PERIOD + Duration::from_secs(1),
        "cold path elapsed {elapsed:?}"
    );

    // Warm server: the default 5s budget applies
    let h = harness(
        MockMcpServerRepository::new().with_server(mcp_server(server_id, workspace_id, 2)),
        MockScaleController::new(),
        MockMaintenanceQueue::new(),
        TransportBehavior::Hang,
    );
    let started = tokio::time::Instant::now();
    let err = h
        .connector
        .connect_with_config(&integration, None, &fast_retry(1))
        .await
        .unwrap_err();
    assert!(matches!(err, McpConnectError::Connect(_)));
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6),
        "warm path elapsed {elapsed:?}"
    );
}

// ============================================================================
// Bookkeeping
// ============================================================================

#[tokio::test(start_paused = true)]
async fn bookkeeping_failure_still_hands_back_the_connection() {
    let workspace_id = Uuid::new_v4();
    let server_id = Uuid::new_v4();
    let h = harness(
        MockMcpServerRepository::new().with_server(mcp_server(server_id, workspace_id, 2)),
        MockScaleController::new(),
        MockMaintenanceQueue::failing(),
        TransportBehavior::SucceedAfter(0),
    );
    let integration = hosted_integration(workspace_id, Some(server_id));

    let conn = h.connector.connect(&integration, None).await.unwrap();

    // The session survives the bookkeeping failure
    assert_eq!(conn.session, FakeSession { attempt: 1 });
    let bookkeeping = conn.bookkeeping_error.unwrap();
    assert!(matches!(bookkeeping, McpConnectError::Bookkeeping(_)));
    assert!(bookkeeping.to_string().contains("queue connection refused"));
}
