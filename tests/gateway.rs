use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;
use tokio::sync::broadcast;

use routeviz::domains::reply::NO_RESPONSE_PLACEHOLDER;
use routeviz::error::RouteVizError;
use routeviz::interfaces::gateway::BackendGateway;
use routeviz::providers::http::HttpGateway;
use routeviz::services::connectivity::{
    ConnectivityMonitor, ConnectivityState, BACKEND_ERROR_CAUSE,
};

fn gateway(server: &MockServer) -> HttpGateway {
    HttpGateway::new(server.base_url(), Duration::from_secs(2)).expect("build gateway")
}

#[tokio::test]
async fn chat_posts_message_and_parses_reply() {
    let server = MockServer::start_async().await;
    let chat_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat")
                .json_body(json!({"message": "show open tickets"}));
            then.status(200).json_body(json!({
                "query_type": "TicketAnalyzerAgent, ChatAgent",
                "agent_responses": {
                    "ticket_analyzer": "3 open tickets",
                    "chat": "Hello!"
                },
                "summary": "3 open tickets"
            }));
        })
        .await;

    let reply = gateway(&server)
        .chat("show open tickets")
        .await
        .expect("chat reply");
    let routed = reply.into_routed();
    assert_eq!(routed.routed_agents, vec!["TicketAnalyzerAgent", "ChatAgent"]);
    assert_eq!(routed.agent_responses.len(), 2);
    assert_eq!(routed.agent_responses[0].agent_id, "ticket_analyzer");
    assert_eq!(routed.summary, "3 open tickets");
    chat_mock.assert_calls(1);
}

#[tokio::test]
async fn chat_reply_that_is_not_an_object_degrades_to_placeholder() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat");
            then.status(200).json_body(json!(["unexpected"]));
        })
        .await;

    let reply = gateway(&server).chat("hi").await.expect("chat reply");
    assert_eq!(reply.into_routed().summary, NO_RESPONSE_PLACEHOLDER);
}

#[tokio::test]
async fn chat_reply_keeps_summary_when_another_field_is_mistyped() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat");
            then.status(200).json_body(json!({
                "query_type": ["chat"],
                "agent_responses": {"chat": "Hi"},
                "summary": "Hello there"
            }));
        })
        .await;

    let routed = gateway(&server)
        .chat("hello")
        .await
        .expect("chat reply")
        .into_routed();
    assert_eq!(routed.summary, "Hello there");
    assert!(routed.routed_agents.is_empty());
    assert_eq!(routed.agent_responses.len(), 1);
    assert_eq!(routed.agent_responses[0].agent_id, "chat");
    assert_eq!(routed.agent_responses[0].response_text, "Hi");
}

#[tokio::test]
async fn chat_error_status_and_invalid_body_are_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat").json_body(json!({"message": "boom"}));
            then.status(500).body("internal error");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat").json_body(json!({"message": "garbled"}));
            then.status(200).body("not json");
        })
        .await;

    let gateway = gateway(&server);
    let err = gateway.chat("boom").await.unwrap_err();
    assert!(matches!(err, RouteVizError::Http(_)), "got {err}");
    let err = gateway.chat("garbled").await.unwrap_err();
    assert!(matches!(err, RouteVizError::Serialization(_)), "got {err}");
}

#[tokio::test]
async fn monitor_tracks_health_and_poll_probes() {
    let server = MockServer::start_async().await;
    let health = server
        .mock_async(|when, then| {
            when.method(GET).path("/health");
            then.status(200).json_body(json!({"status": "ok"}));
        })
        .await;
    let terminal = server
        .mock_async(|when, then| {
            when.method(GET).path("/terminal-output");
            then.status(503);
        })
        .await;

    let (events, mut rx) = broadcast::channel(16);
    let monitor = ConnectivityMonitor::new(Arc::new(gateway(&server)), events);
    assert_eq!(monitor.state().await, ConnectivityState::Unknown);

    assert_eq!(monitor.check().await, ConnectivityState::Connected);
    let polled = monitor.poll().await;
    assert_eq!(polled.last_error(), Some(BACKEND_ERROR_CAUSE));
    assert!(!monitor.state().await.reachable());

    health.assert_calls(1);
    terminal.assert_calls(1);
    assert!(matches!(
        rx.recv().await.unwrap(),
        routeviz::services::session::SessionEvent::Connectivity(ConnectivityState::Connected)
    ));
}

#[tokio::test]
async fn monitor_reports_unreachable_backend_with_address() {
    let gateway = HttpGateway::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let (events, _rx) = broadcast::channel(16);
    let monitor = ConnectivityMonitor::new(Arc::new(gateway), events);

    let state = monitor.check().await;
    assert_eq!(
        state.last_error(),
        Some("Cannot connect to backend server at http://127.0.0.1:9")
    );
}

#[tokio::test]
async fn monitor_retry_clears_cause_and_recovers() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/health");
            then.status(200);
        })
        .await;

    let (events, _rx) = broadcast::channel(16);
    let monitor = ConnectivityMonitor::new(Arc::new(gateway(&server)), events);
    monitor.mark_disconnected("Connection failed during message send").await;
    assert!(monitor.state().await.last_error().is_some());

    assert_eq!(monitor.retry().await, ConnectivityState::Connected);
    assert_eq!(monitor.state().await.last_error(), None);
}
