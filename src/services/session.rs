use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::config::{Config, TimelineConfig};
use crate::domains::conversation::{ConversationStore, Message};
use crate::error::{Result, RouteVizError};
use crate::interfaces::gateway::BackendGateway;
use crate::services::connectivity::{ConnectivityMonitor, ConnectivityState, SEND_FAILED_CAUSE};
use crate::services::timeline::{self, ActiveNodes, TimelinePlan};

pub const SUPERSEDED_PLACEHOLDER: &str = "(superseded by a newer message)";
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ActiveNodes(ActiveNodes),
    Terminal(String),
    MessageAppended { index: usize, message: Message },
    MessageResolved { index: usize, message: Message },
    Connectivity(ConnectivityState),
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub busy: bool,
    pub active_nodes: ActiveNodes,
    pub terminal: String,
    pub messages: Vec<Message>,
    pub connectivity: ConnectivityState,
}

#[derive(Default)]
struct SessionState {
    generation: u64,
    busy: bool,
    active: ActiveNodes,
    terminal: String,
    conversation: ConversationStore,
    /// Reply text of the current request once it has arrived.
    reply_text: Option<String>,
    timeline_task: Option<JoinHandle<()>>,
}

struct SessionInner {
    gateway: Arc<dyn BackendGateway>,
    monitor: ConnectivityMonitor,
    timeline: TimelineConfig,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

/// One chat session against a backend.
///
/// Each submission bumps a generation counter. Every deferred mutation
/// (reply handling, timeline steps) carries the generation it was created
/// for and is dropped once the session has moved past it.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    pub fn new(gateway: Arc<dyn BackendGateway>, timeline: TimelineConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let monitor = ConnectivityMonitor::new(Arc::clone(&gateway), events.clone());
        Self {
            inner: Arc::new(SessionInner {
                gateway,
                monitor,
                timeline,
                state: Mutex::new(SessionState::default()),
                events,
            }),
        }
    }

    pub fn from_config(gateway: Arc<dyn BackendGateway>, config: &Config) -> Self {
        Self::new(gateway, config.timeline)
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.inner.monitor
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub async fn busy(&self) -> bool {
        self.inner.state.lock().await.busy
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let connectivity = self.inner.monitor.state().await;
        let state = self.inner.state.lock().await;
        SessionSnapshot {
            generation: state.generation,
            busy: state.busy,
            active_nodes: state.active.clone(),
            terminal: state.terminal.clone(),
            messages: state.conversation.messages().to_vec(),
            connectivity,
        }
    }

    /// Sends `text` to the backend and schedules its timeline.
    ///
    /// Returns the request's generation once the reply has arrived; the
    /// timeline keeps running in the background. A request still in flight
    /// or animating is cancelled and replaced.
    pub async fn submit(&self, text: &str) -> Result<u64> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RouteVizError::Request("message is empty".to_string()));
        }
        let connectivity = self.inner.monitor.state().await;
        if !connectivity.reachable() {
            let cause = connectivity
                .last_error()
                .unwrap_or("backend connectivity has not been confirmed")
                .to_string();
            return Err(RouteVizError::Connectivity(cause));
        }

        let generation = {
            let mut state = self.inner.state.lock().await;
            let mut events = self.supersede(&mut *state);
            state.generation += 1;
            state.busy = true;
            state.reply_text = None;
            for message in [Message::user(text), Message::pending_bot()] {
                let index = state.conversation.append(message.clone());
                events.push(SessionEvent::MessageAppended { index, message });
            }
            self.emit(events);
            state.generation
        };
        info!(generation, "Chat request sent");

        match self.inner.gateway.chat(text).await {
            Ok(reply) => {
                let routed = reply.into_routed();
                let plan = timeline::plan(&routed, &self.inner.timeline);
                debug!(
                    generation,
                    agents = ?routed.routed_agents,
                    steps = plan.highlight_count(),
                    "Chat reply received"
                );
                let mut state = self.inner.state.lock().await;
                if state.generation != generation {
                    debug!(generation, "Dropping reply for superseded request");
                    return Ok(generation);
                }
                state.reply_text = Some(plan.reply_text.clone());
                let session = self.clone();
                state.timeline_task = Some(tokio::spawn(async move {
                    session.run_timeline(generation, plan).await;
                }));
                Ok(generation)
            }
            Err(err) => {
                warn!(generation, error = %err, "Chat request failed");
                {
                    let mut state = self.inner.state.lock().await;
                    if state.generation != generation {
                        return Err(err);
                    }
                    let detail = format!(
                        "Failed to connect to backend. Make sure the server is running at {}",
                        self.inner.gateway.base_url()
                    );
                    let index = state.conversation.fail_pending(detail);
                    state.busy = false;
                    let mut events = Vec::new();
                    if let Some(message) = state.conversation.get(index).cloned() {
                        events.push(SessionEvent::MessageResolved { index, message });
                    }
                    self.emit(events);
                }
                self.inner.monitor.mark_disconnected(SEND_FAILED_CAUSE).await;
                Err(match err {
                    RouteVizError::Request(_) => err,
                    other => RouteVizError::Request(other.to_string()),
                })
            }
        }
    }

    /// Replays the user text behind the retryable error at `index`.
    pub async fn retry(&self, index: usize) -> Result<u64> {
        let text = {
            let state = self.inner.state.lock().await;
            state.conversation.retry_text(index).ok_or_else(|| {
                RouteVizError::Request(format!("message {index} cannot be retried"))
            })?
        };
        if !self.inner.monitor.state().await.reachable() {
            self.inner.monitor.retry().await;
        }
        info!(index, "Retrying failed message");
        self.submit(&text).await
    }

    /// Settles whatever the current generation still owes the UI: stops its
    /// timeline, clears the highlight and resolves its pending message.
    fn supersede(&self, state: &mut SessionState) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if let Some(task) = state.timeline_task.take() {
            task.abort();
        }
        if !state.busy {
            return events;
        }
        debug!(generation = state.generation, "Superseding running request");
        if !state.active.is_empty() {
            state.active.clear();
            events.push(SessionEvent::ActiveNodes(ActiveNodes::new()));
        }
        let text = state
            .reply_text
            .take()
            .unwrap_or_else(|| SUPERSEDED_PLACEHOLDER.to_string());
        if let Some(index) = state.conversation.resolve_pending(text) {
            if let Some(message) = state.conversation.get(index).cloned() {
                events.push(SessionEvent::MessageResolved { index, message });
            }
        }
        state.busy = false;
        events
    }

    async fn run_timeline(&self, generation: u64, plan: TimelinePlan) {
        let start = Instant::now();
        let TimelinePlan {
            steps,
            terminal_at,
            terminal,
            resolve_at,
            reply_text,
        } = plan;

        for step in steps {
            sleep_until(start + step.at).await;
            let applied = self
                .apply(generation, |state| {
                    state.active = step.active.clone();
                    vec![SessionEvent::ActiveNodes(step.active)]
                })
                .await;
            if !applied {
                return;
            }
        }

        sleep_until(start + terminal_at).await;
        let applied = self
            .apply(generation, |state| {
                state.active.clear();
                state.terminal = terminal.clone();
                vec![
                    SessionEvent::ActiveNodes(ActiveNodes::new()),
                    SessionEvent::Terminal(terminal),
                ]
            })
            .await;
        if !applied {
            return;
        }

        sleep_until(start + resolve_at).await;
        self.apply(generation, |state| {
            state.busy = false;
            state.reply_text = None;
            state.timeline_task = None;
            let mut events = Vec::new();
            if let Some(index) = state.conversation.resolve_pending(reply_text) {
                if let Some(message) = state.conversation.get(index).cloned() {
                    events.push(SessionEvent::MessageResolved { index, message });
                }
            }
            events
        })
        .await;
        debug!(generation, "Timeline finished");
    }

    /// Runs `mutate` only if `generation` is still current.
    async fn apply<F>(&self, generation: u64, mutate: F) -> bool
    where
        F: FnOnce(&mut SessionState) -> Vec<SessionEvent>,
    {
        let mut state = self.inner.state.lock().await;
        if state.generation != generation {
            debug!(generation, current = state.generation, "Stale timeline step dropped");
            return false;
        }
        let events = mutate(&mut *state);
        self.emit(events);
        true
    }

    fn emit(&self, events: Vec<SessionEvent>) {
        for event in events {
            let _ = self.inner.events.send(event);
        }
    }
}
