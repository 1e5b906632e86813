use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::error::{Result, RouteVizError};
use crate::interfaces::gateway::BackendGateway;
use crate::interfaces::scheduler::ScheduledJob;
use crate::services::session::SessionEvent;

pub const BACKEND_ERROR_CAUSE: &str = "Backend server returned an error";
pub const SEND_FAILED_CAUSE: &str = "Connection failed during message send";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectivityState {
    /// No probe has finished yet.
    Unknown,
    Connected,
    Disconnected { cause: String },
}

impl ConnectivityState {
    pub fn reachable(&self) -> bool {
        matches!(self, ConnectivityState::Connected)
    }

    pub fn last_error(&self) -> Option<&str> {
        match self {
            ConnectivityState::Disconnected { cause } => Some(cause.as_str()),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct ConnectivityMonitor {
    gateway: Arc<dyn BackendGateway>,
    state: Arc<RwLock<ConnectivityState>>,
    events: broadcast::Sender<SessionEvent>,
}

impl ConnectivityMonitor {
    pub fn new(gateway: Arc<dyn BackendGateway>, events: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            gateway,
            state: Arc::new(RwLock::new(ConnectivityState::Unknown)),
            events,
        }
    }

    pub async fn state(&self) -> ConnectivityState {
        self.state.read().await.clone()
    }

    /// Probes `/health`.
    pub async fn check(&self) -> ConnectivityState {
        let outcome = self.gateway.health().await;
        self.apply_probe("health", outcome).await
    }

    /// Probes `/terminal-output`; used by the periodic poll.
    pub async fn poll(&self) -> ConnectivityState {
        let outcome = self.gateway.terminal_output().await;
        self.apply_probe("terminal-output", outcome).await
    }

    /// Clears the recorded cause and probes `/health` again.
    pub async fn retry(&self) -> ConnectivityState {
        self.transition(ConnectivityState::Unknown).await;
        self.check().await
    }

    pub async fn mark_disconnected(&self, cause: impl Into<String>) {
        self.transition(ConnectivityState::Disconnected {
            cause: cause.into(),
        })
        .await;
    }

    async fn apply_probe(&self, probe: &str, outcome: Result<()>) -> ConnectivityState {
        let next = match outcome {
            Ok(()) => ConnectivityState::Connected,
            Err(RouteVizError::Http(detail)) => {
                warn!(probe, %detail, "Backend probe returned an error status");
                ConnectivityState::Disconnected {
                    cause: BACKEND_ERROR_CAUSE.to_string(),
                }
            }
            Err(err) => {
                warn!(probe, error = %err, "Backend probe failed");
                ConnectivityState::Disconnected {
                    cause: format!(
                        "Cannot connect to backend server at {}",
                        self.gateway.base_url()
                    ),
                }
            }
        };
        self.transition(next.clone()).await;
        next
    }

    async fn transition(&self, next: ConnectivityState) {
        let mut state = self.state.write().await;
        if *state == next {
            return;
        }
        info!(from = ?*state, to = ?next, "Connectivity changed");
        *state = next.clone();
        drop(state);
        let _ = self.events.send(SessionEvent::Connectivity(next));
    }
}

/// Periodic `/terminal-output` probe.
pub struct ConnectivityPollJob {
    monitor: ConnectivityMonitor,
    period: Duration,
}

impl ConnectivityPollJob {
    pub fn new(monitor: ConnectivityMonitor, period: Duration) -> Self {
        Self { monitor, period }
    }
}

#[async_trait]
impl ScheduledJob for ConnectivityPollJob {
    fn name(&self) -> &str {
        "connectivity_poll"
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn tick(&self) -> Result<()> {
        self.monitor.poll().await;
        Ok(())
    }
}
