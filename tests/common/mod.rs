#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use routeviz::domains::reply::ChatReply;
use routeviz::error::{Result, RouteVizError};
use routeviz::interfaces::gateway::BackendGateway;

pub enum Scripted {
    Reply(Value),
    Delayed(Duration, Value),
    Fail,
}

/// Gateway double that answers chat calls from a queue.
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Scripted>>,
    sent: Mutex<Vec<String>>,
    healthy: bool,
}

impl ScriptedGateway {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            sent: Mutex::new(Vec::new()),
            healthy: true,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

fn to_reply(value: Value) -> Result<ChatReply> {
    Ok(ChatReply::from_value(&value))
}

#[async_trait]
impl BackendGateway for ScriptedGateway {
    fn base_url(&self) -> &str {
        "http://scripted.test"
    }

    async fn health(&self) -> Result<()> {
        if self.healthy {
            Ok(())
        } else {
            Err(RouteVizError::Connectivity("connection refused".to_string()))
        }
    }

    async fn terminal_output(&self) -> Result<()> {
        self.health().await
    }

    async fn chat(&self, message: &str) -> Result<ChatReply> {
        self.sent.lock().unwrap().push(message.to_string());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(value)) => to_reply(value),
            Some(Scripted::Delayed(delay, value)) => {
                tokio::time::sleep(delay).await;
                to_reply(value)
            }
            Some(Scripted::Fail) | None => {
                Err(RouteVizError::Request("connection reset".to_string()))
            }
        }
    }
}
