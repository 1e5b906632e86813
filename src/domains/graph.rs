use std::fmt;

/// A node of the routing diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Router,
    TicketAnalyzer,
    NewsAggregator,
    ActivityTracker,
    InfrastructureCostMonitor,
    Chat,
    /// An agent the backend reported that the diagram has no node for.
    Unknown(String),
}

impl NodeId {
    /// Maps a backend agent identifier onto a node.
    ///
    /// Both the backend class names (`TicketAnalyzerAgent`) and the node ids
    /// (`ticket_analyzer`) are accepted. Anything else becomes
    /// [`NodeId::Unknown`] carrying the trimmed identifier.
    pub fn from_agent(agent: &str) -> NodeId {
        match agent.trim() {
            "router" => NodeId::Router,
            "TicketAnalyzerAgent" | "ticket_analyzer" => NodeId::TicketAnalyzer,
            "NewsAggregatorAgent" | "news_aggregator" => NodeId::NewsAggregator,
            "ActivityTrackerAgent" | "activity_tracker" => NodeId::ActivityTracker,
            "InfrastructureCostMonitorAgent" | "infrastructure_cost_monitor" => {
                NodeId::InfrastructureCostMonitor
            }
            "ChatAgent" | "chat" => NodeId::Chat,
            other => NodeId::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeId::Router => "router",
            NodeId::TicketAnalyzer => "ticket_analyzer",
            NodeId::NewsAggregator => "news_aggregator",
            NodeId::ActivityTracker => "activity_tracker",
            NodeId::InfrastructureCostMonitor => "infrastructure_cost_monitor",
            NodeId::Chat => "chat",
            NodeId::Unknown(id) => id.as_str(),
        }
    }

    pub fn spec(&self) -> Option<&'static NodeSpec> {
        NODES.iter().find(|node| node.id == self.as_str())
    }

    pub fn label(&self) -> String {
        match self.spec() {
            Some(spec) => spec.label.to_string(),
            None => format!("Unknown agent ({})", self.as_str()),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Router,
    Agent,
}

#[derive(Debug)]
pub struct NodeSpec {
    pub id: &'static str,
    pub kind: NodeKind,
    pub label: &'static str,
    pub description: &'static str,
    pub details: &'static str,
}

#[derive(Debug)]
pub struct EdgeSpec {
    pub from: &'static str,
    pub to: &'static str,
    pub condition: &'static str,
}

pub static NODES: [NodeSpec; 6] = [
    NodeSpec {
        id: "router",
        kind: NodeKind::Router,
        label: "Agentic AI",
        description: "Routes user input to one or more agents",
        details: "Function: router_node()\nDecides which agent handles the query",
    },
    NodeSpec {
        id: "ticket_analyzer",
        kind: NodeKind::Agent,
        label: "Ticket Analyzer",
        description: "Handles tickets raised by employees, players, or parents",
        details: "Function: ticket_analyzer_node()\nCapabilities: Ticket management, status tracking",
    },
    NodeSpec {
        id: "news_aggregator",
        kind: NodeKind::Agent,
        label: "News and Announcements",
        description: "Collects latest news articles",
        details: "Function: news_aggregator_node()\nCapabilities: News fetching, article aggregation",
    },
    NodeSpec {
        id: "activity_tracker",
        kind: NodeKind::Agent,
        label: "Activity Tracker",
        description: "Tracks employee activities like a Kanban board",
        details: "Function: activity_tracker_node()\nCapabilities: Task tracking, Kanban view",
    },
    NodeSpec {
        id: "infrastructure_cost_monitor",
        kind: NodeKind::Agent,
        label: "Infrastructure Cost Monitor",
        description: "Monitors cloud infrastructure costs",
        details: "Function: infrastructure_cost_monitor_node()\nCapabilities: Cloud cost tracking, pricing comparison",
    },
    NodeSpec {
        id: "chat",
        kind: NodeKind::Agent,
        label: "Chat Agent",
        description: "General conversation and company information",
        details: "Function: chat_node()\nCapabilities: General chat, company info",
    },
];

pub static EDGES: [EdgeSpec; 5] = [
    EdgeSpec {
        from: "router",
        to: "ticket_analyzer",
        condition: "TicketAnalyzerAgent",
    },
    EdgeSpec {
        from: "router",
        to: "news_aggregator",
        condition: "NewsAggregatorAgent",
    },
    EdgeSpec {
        from: "router",
        to: "activity_tracker",
        condition: "ActivityTrackerAgent",
    },
    EdgeSpec {
        from: "router",
        to: "infrastructure_cost_monitor",
        condition: "InfrastructureCostMonitorAgent",
    },
    EdgeSpec {
        from: "router",
        to: "chat",
        condition: "ChatAgent",
    },
];
