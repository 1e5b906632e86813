//! Planning of the highlight sequence and terminal block for one reply.
//!
//! Planning is pure: [`plan`] turns a [`RoutedResponse`] into offsets
//! relative to the moment the reply arrived. Applying the plan against
//! shared state is the session's job.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use crate::config::TimelineConfig;
use crate::domains::graph::NodeId;
use crate::domains::reply::RoutedResponse;

pub type ActiveNodes = BTreeSet<NodeId>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionStep {
    pub active: ActiveNodes,
    pub at: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelinePlan {
    /// Highlight steps, strictly increasing in `at`.
    pub steps: Vec<ExecutionStep>,
    /// When all nodes go dark and the terminal block appears.
    pub terminal_at: Duration,
    pub terminal: String,
    /// When the pending chat message resolves.
    pub resolve_at: Duration,
    pub reply_text: String,
}

impl TimelinePlan {
    pub fn highlight_count(&self) -> usize {
        self.steps.len()
    }
}

fn active(nodes: impl IntoIterator<Item = NodeId>) -> ActiveNodes {
    nodes.into_iter().collect()
}

pub fn plan(response: &RoutedResponse, config: &TimelineConfig) -> TimelinePlan {
    let mut at = Duration::ZERO;
    let mut steps = vec![ExecutionStep {
        active: active([NodeId::Router]),
        at,
    }];

    for agent in &response.routed_agents {
        at += config.agent_step();
        steps.push(ExecutionStep {
            active: active([NodeId::Router, NodeId::from_agent(agent)]),
            at,
        });
        at += config.router_step();
        steps.push(ExecutionStep {
            active: active([NodeId::Router]),
            at,
        });
    }

    let terminal_at = at + config.terminal_delay();
    TimelinePlan {
        steps,
        terminal_at,
        terminal: terminal_block(response),
        resolve_at: terminal_at + config.resolve_delay(),
        reply_text: response.summary.clone(),
    }
}

/// Renders the terminal text for one reply.
///
/// Responses with identical text are shown once, under the first agent that
/// produced them. The summary is appended only when it differs from every
/// response already shown.
pub fn terminal_block(response: &RoutedResponse) -> String {
    let mut out = String::new();
    if !response.routed_agents.is_empty() {
        out.push_str("Invoking agents: ");
        out.push_str(&response.routed_agents.join(", "));
        out.push_str("\n\n");
    }

    let mut shown: HashSet<&str> = HashSet::new();
    for invocation in &response.agent_responses {
        let text = invocation.response_text.as_str();
        if !shown.insert(text) {
            continue;
        }
        let agent = &invocation.agent_id;
        out.push_str(&format!(
            "\n[{agent} is answering...]\n--- {agent} ---\n{text}\n"
        ));
    }

    if !response.summary.is_empty() && !shown.contains(response.summary.as_str()) {
        out.push('\n');
        out.push_str(&response.summary);
    }
    out
}
