use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::domains::reply::{ChatReply, ChatRequest};
use crate::error::{Result, RouteVizError};
use crate::interfaces::gateway::BackendGateway;

#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RouteVizError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.backend_url.clone(), config.request_timeout())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn probe(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RouteVizError::Connectivity(e.to_string()))?;
        let status = response.status();
        debug!(%url, %status, "Probe finished");
        if !status.is_success() {
            return Err(RouteVizError::Http(format!("GET {path} returned {status}")));
        }
        Ok(())
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn health(&self) -> Result<()> {
        self.probe("/health").await
    }

    async fn terminal_output(&self) -> Result<()> {
        self.probe("/terminal-output").await
    }

    async fn chat(&self, message: &str) -> Result<ChatReply> {
        let url = self.url("/chat");
        let body = ChatRequest {
            message: message.to_string(),
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RouteVizError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RouteVizError::Http(format!("POST /chat returned {status}")));
        }
        let raw = response
            .text()
            .await
            .map_err(|e| RouteVizError::Request(e.to_string()))?;
        let value: Value =
            serde_json::from_str(&raw).map_err(|e| RouteVizError::Serialization(e.to_string()))?;
        // A body that is valid JSON but not an object carries nothing usable;
        // it degrades to an empty reply instead of failing the request.
        if !value.is_object() {
            debug!(%url, "Chat reply is not a JSON object");
        }
        Ok(ChatReply::from_value(&value))
    }
}
