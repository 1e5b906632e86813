use serde::Serialize;
use serde_json::{Map, Value};

pub const NO_RESPONSE_PLACEHOLDER: &str = "No response";

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Body returned by `POST /chat`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatReply {
    pub query_type: Option<String>,
    pub agent_responses: Option<Value>,
    pub summary: Option<String>,
    pub response: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInvocation {
    pub agent_id: String,
    pub response_text: String,
}

/// A chat reply reduced to what the timeline needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutedResponse {
    pub routed_agents: Vec<String>,
    pub agent_responses: Vec<AgentInvocation>,
    pub summary: String,
}

impl RoutedResponse {
    pub fn new(
        routed_agents: Vec<String>,
        agent_responses: Vec<AgentInvocation>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            routed_agents,
            agent_responses,
            summary: summary.into(),
        }
    }
}

/// Splits a comma-separated agent field into trimmed, non-empty,
/// first-seen-unique tokens.
pub fn parse_routed_agents(query_type: Option<&str>) -> Vec<String> {
    let mut agents: Vec<String> = Vec::new();
    for token in query_type.unwrap_or_default().split(',') {
        let token = token.trim();
        if token.is_empty() || agents.iter().any(|seen| seen == token) {
            continue;
        }
        agents.push(token.to_string());
    }
    agents
}

fn response_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

impl ChatReply {
    /// Reads each field on its own; a field of the wrong type is treated
    /// as absent without affecting the others.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            query_type: text("query_type"),
            agent_responses: value.get("agent_responses").filter(|v| v.is_object()).cloned(),
            summary: text("summary"),
            response: text("response"),
        }
    }

    fn agent_entries(&self) -> Option<&Map<String, Value>> {
        self.agent_responses.as_ref().and_then(Value::as_object)
    }

    /// `summary` wins over `response`; both absent or empty gives the placeholder.
    pub fn summary_text(&self) -> String {
        non_empty(self.summary.as_deref())
            .or_else(|| non_empty(self.response.as_deref()))
            .unwrap_or(NO_RESPONSE_PLACEHOLDER)
            .to_string()
    }

    pub fn into_routed(self) -> RoutedResponse {
        let routed_agents = parse_routed_agents(self.query_type.as_deref());
        let agent_responses: Vec<AgentInvocation> = self
            .agent_entries()
            .map(|entries| {
                entries
                    .iter()
                    .map(|(agent, value)| AgentInvocation {
                        agent_id: agent.clone(),
                        response_text: response_text(value),
                    })
                    .collect()
            })
            .unwrap_or_default();
        RoutedResponse {
            summary: self.summary_text(),
            routed_agents,
            agent_responses,
        }
    }
}
