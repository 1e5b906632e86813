use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, RouteVizError};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Step durations for the execution timeline, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub agent_step_ms: u64,
    pub router_step_ms: u64,
    pub terminal_delay_ms: u64,
    pub resolve_delay_ms: u64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            agent_step_ms: 1200,
            router_step_ms: 800,
            terminal_delay_ms: 800,
            resolve_delay_ms: 500,
        }
    }
}

impl TimelineConfig {
    pub fn agent_step(&self) -> Duration {
        Duration::from_millis(self.agent_step_ms)
    }

    pub fn router_step(&self) -> Duration {
        Duration::from_millis(self.router_step_ms)
    }

    pub fn terminal_delay(&self) -> Duration {
        Duration::from_millis(self.terminal_delay_ms)
    }

    pub fn resolve_delay(&self) -> Duration {
        Duration::from_millis(self.resolve_delay_ms)
    }

    fn validate(&self) -> Result<()> {
        // Offsets must strictly increase, so every step needs a non-zero width.
        let steps = [
            ("agent_step_ms", self.agent_step_ms),
            ("router_step_ms", self.router_step_ms),
            ("terminal_delay_ms", self.terminal_delay_ms),
            ("resolve_delay_ms", self.resolve_delay_ms),
        ];
        for (name, value) in steps {
            if value == 0 {
                return Err(RouteVizError::Config(format!(
                    "timeline.{name} must be greater than 0"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub timeline: TimelineConfig,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self::convention_defaults()
    }
}

impl Config {
    pub fn convention_defaults() -> Self {
        Self {
            backend_url: default_backend_url(),
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            timeline: TimelineConfig::default(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| RouteVizError::Config(format!("{}: {e}", path.display())))?;
        let config: Config =
            serde_json::from_str(&raw).map_err(|e| RouteVizError::Config(e.to_string()))?;
        config.normalized()
    }

    /// Loads `path` when it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file; using defaults");
            Ok(Self::convention_defaults())
        }
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Result<Self> {
        self.backend_url = url.into();
        self.normalized()
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Result<Self> {
        self.poll_interval_secs = secs;
        self.normalized()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn normalized(mut self) -> Result<Self> {
        let url = self.backend_url.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            return Err(RouteVizError::Config("backend_url cannot be empty".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RouteVizError::Config(format!(
                "backend_url must start with http:// or https://, got `{url}`"
            )));
        }
        self.backend_url = url;
        if self.poll_interval_secs == 0 {
            return Err(RouteVizError::Config(
                "poll_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(RouteVizError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.timeline.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convention_defaults_match_page_timings() {
        let config = Config::convention_defaults();
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.timeline.agent_step(), Duration::from_millis(1200));
        assert_eq!(config.timeline.router_step(), Duration::from_millis(800));
        assert_eq!(config.timeline.terminal_delay(), Duration::from_millis(800));
        assert_eq!(config.timeline.resolve_delay(), Duration::from_millis(500));
    }

    #[test]
    fn backend_url_is_trimmed_and_checked() {
        let config = Config::convention_defaults()
            .with_backend_url(" http://10.0.0.2:9000/ ")
            .unwrap();
        assert_eq!(config.backend_url, "http://10.0.0.2:9000");

        let err = Config::convention_defaults()
            .with_backend_url("10.0.0.2:9000")
            .unwrap_err();
        assert!(matches!(err, RouteVizError::Config(_)));
    }

    #[test]
    fn partial_timeline_section_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"timeline": {"agent_step_ms": 10}}"#).unwrap();
        let config = config.normalized().unwrap();
        assert_eq!(config.timeline.agent_step_ms, 10);
        assert_eq!(config.timeline.router_step_ms, 800);
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn zero_step_duration_is_rejected() {
        let config: Config =
            serde_json::from_str(r#"{"timeline": {"router_step_ms": 0}}"#).unwrap();
        let err = config.normalized().unwrap_err();
        assert!(err.to_string().contains("router_step_ms"));
    }

    #[test]
    fn poll_interval_override_is_validated() {
        let config = Config::convention_defaults()
            .with_poll_interval_secs(2)
            .unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(2));

        let err = Config::convention_defaults()
            .with_poll_interval_secs(0)
            .unwrap_err();
        assert!(matches!(err, RouteVizError::Config(_)));
        assert!(err.to_string().contains("poll_interval_secs"));
    }
}
