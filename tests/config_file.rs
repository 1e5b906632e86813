use std::time::Duration;

use routeviz::config::Config;
use routeviz::error::RouteVizError;

#[test]
fn config_from_file_overrides_defaults() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = temp.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "backend_url": "http://10.1.2.3:8000/",
            "poll_interval_secs": 2,
            "timeline": {"agent_step_ms": 300, "router_step_ms": 200}
        }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).expect("load config");
    assert_eq!(config.backend_url, "http://10.1.2.3:8000");
    assert_eq!(config.poll_interval(), Duration::from_secs(2));
    assert_eq!(config.request_timeout(), Duration::from_secs(120));
    assert_eq!(config.timeline.agent_step_ms, 300);
    assert_eq!(config.timeline.router_step_ms, 200);
    assert_eq!(config.timeline.terminal_delay_ms, 800);
}

#[test]
fn missing_file_falls_back_and_broken_file_fails() {
    let temp = tempfile::tempdir().expect("temp dir");
    let missing = temp.path().join("absent.json");
    let config = Config::load_or_default(&missing).expect("defaults");
    assert_eq!(config.backend_url, "http://localhost:8000");

    let broken = temp.path().join("broken.json");
    std::fs::write(&broken, "{ not json").unwrap();
    let err = Config::load_or_default(&broken).unwrap_err();
    assert!(matches!(err, RouteVizError::Config(_)));
}

#[test]
fn default_config_path_follows_root_override() {
    let temp = tempfile::tempdir().expect("temp dir");
    routeviz::runtime_paths::set_config_root_override(Some(temp.path().to_path_buf()));
    let path = routeviz::runtime_paths::default_config_path();
    routeviz::runtime_paths::set_config_root_override(None);
    assert!(path.starts_with(&*temp.path().to_string_lossy()));
}
