//! Line-oriented front-end: command parsing and plain-text rendering.

use crate::domains::conversation::{Message, MessageKind};
use crate::domains::graph::{NodeId, EDGES, NODES};
use crate::services::connectivity::ConnectivityState;
use crate::services::session::SessionEvent;
use crate::services::timeline::ActiveNodes;

pub const HELP: &str = "\
Type a message and press Enter to send it.
  /retry N     resend the message behind failed entry N
  /reconnect   probe the backend again
  /graph       show the routing diagram
  /history     list the conversation
  /help        show this help
  /quit        exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    /// Zero-based message index.
    Retry(usize),
    Reconnect,
    Graph,
    History,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Send(line.to_string());
        };
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        match (name, arg) {
            ("retry", Some(raw)) => match raw.parse::<usize>() {
                Ok(number) if number > 0 => Command::Retry(number - 1),
                _ => Command::Invalid(format!("not a message number: {raw}")),
            },
            ("retry", None) => Command::Invalid("usage: /retry N".to_string()),
            ("reconnect", None) => Command::Reconnect,
            ("graph", None) => Command::Graph,
            ("history", None) => Command::History,
            ("help", None) => Command::Help,
            ("quit" | "exit", None) => Command::Quit,
            _ => Command::Invalid(format!("unknown command: /{rest}")),
        }
    }
}

pub fn render_active(active: &ActiveNodes) -> String {
    if active.is_empty() {
        return "[graph] idle".to_string();
    }
    let labels: Vec<String> = active
        .iter()
        .map(|node| match node {
            NodeId::Unknown(_) => format!("({})", node.label()),
            known => known.label(),
        })
        .collect();
    format!("[graph] {}", labels.join(" -> "))
}

pub fn render_message(index: usize, message: &Message) -> String {
    let number = index + 1;
    match message.kind {
        MessageKind::User => format!("#{number} you: {}", message.text),
        MessageKind::Bot if message.pending => format!("#{number} bot: ..."),
        MessageKind::Bot => format!("#{number} bot: {}", message.text),
        MessageKind::Error if message.retryable => {
            format!("#{number} error: {} (/retry {number})", message.text)
        }
        MessageKind::Error => format!("#{number} error: {}", message.text),
    }
}

pub fn render_connectivity(state: &ConnectivityState) -> String {
    match state {
        ConnectivityState::Unknown => "[backend] checking...".to_string(),
        ConnectivityState::Connected => "[backend] connected".to_string(),
        ConnectivityState::Disconnected { cause } => {
            format!("[backend] disconnected: {cause} (/reconnect to retry)")
        }
    }
}

pub fn render_terminal(block: &str) -> String {
    let mut out = String::from("----- terminal -----\n");
    out.push_str(block.trim_matches('\n'));
    out.push_str("\n--------------------");
    out
}

pub fn render_graph() -> String {
    let mut lines = Vec::new();
    for node in &NODES {
        lines.push(format!("{:<28} {}", node.label, node.description));
        lines.extend(node.details.lines().map(|detail| format!("    {detail}")));
    }
    lines.push(String::new());
    for edge in &EDGES {
        lines.push(format!("{} -> {}  [{}]", edge.from, edge.to, edge.condition));
    }
    lines.join("\n")
}

/// Text to print for a session event. `None` for events that only matter
/// to the timeline's internal bookkeeping.
pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::ActiveNodes(active) => Some(render_active(active)),
        SessionEvent::Terminal(block) => Some(render_terminal(block)),
        SessionEvent::MessageAppended { index, message } if message.pending => {
            Some(render_message(*index, message))
        }
        SessionEvent::MessageAppended { .. } => None,
        SessionEvent::MessageResolved { index, message } => Some(render_message(*index, message)),
        SessionEvent::Connectivity(state) => Some(render_connectivity(state)),
    }
}
