use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use routeviz::config::Config;
use routeviz::console::{self, Command};
use routeviz::error::Result;
use routeviz::interfaces::gateway::BackendGateway;
use routeviz::providers::http::HttpGateway;
use routeviz::scheduler::Scheduler;
use routeviz::services::connectivity::ConnectivityPollJob;
use routeviz::services::session::Session;

#[derive(Parser, Debug)]
#[command(name = "routeviz")]
#[command(about = "Chat with an agent-routing backend and watch its routing decisions")]
struct Cli {
    /// Backend base URL; overrides the config file.
    #[arg(long, env = "ROUTEVIZ_BACKEND")]
    backend: Option<String>,

    #[arg(long, default_value_t = routeviz::runtime_paths::default_config_path())]
    config: String,

    /// Seconds between connectivity polls; overrides the config file.
    #[arg(long)]
    poll_secs: Option<u64>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(backend) = &cli.backend {
        config = config.with_backend_url(backend.clone())?;
    }
    if let Some(secs) = cli.poll_secs {
        config = config.with_poll_interval_secs(secs)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    routeviz::logging::init_tracing("routeviz");
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(backend = %config.backend_url, "Starting routeviz");

    let gateway: Arc<dyn BackendGateway> = Arc::new(HttpGateway::from_config(&config)?);
    let session = Session::from_config(gateway, &config);

    let mut events = session.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = console::render_event(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Display fell behind session events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("{}", console::HELP);
    session.monitor().check().await;

    let mut scheduler = Scheduler::new();
    scheduler.register_job(Arc::new(ConnectivityPollJob::new(
        session.monitor().clone(),
        config.poll_interval(),
    )));
    scheduler.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| routeviz::RouteVizError::Runtime(e.to_string()))?
    {
        match Command::parse(&line) {
            Command::Empty => {}
            Command::Send(text) => {
                if session.busy().await {
                    println!("Waiting for the current response to finish...");
                    continue;
                }
                let session = session.clone();
                tokio::spawn(async move {
                    if let Err(err) = session.submit(&text).await {
                        println!("! {err}");
                    }
                });
            }
            Command::Retry(index) => {
                if session.busy().await {
                    println!("Waiting for the current response to finish...");
                    continue;
                }
                let session = session.clone();
                tokio::spawn(async move {
                    if let Err(err) = session.retry(index).await {
                        println!("! {err}");
                    }
                });
            }
            Command::Reconnect => {
                session.monitor().retry().await;
            }
            Command::Graph => println!("{}", console::render_graph()),
            Command::History => {
                let snapshot = session.snapshot().await;
                println!("{}", console::render_connectivity(&snapshot.connectivity));
                for (index, message) in snapshot.messages.iter().enumerate() {
                    println!("{}", console::render_message(index, message));
                }
                if !snapshot.terminal.is_empty() {
                    println!("{}", console::render_terminal(&snapshot.terminal));
                }
            }
            Command::Help => println!("{}", console::HELP),
            Command::Invalid(reason) => println!("! {reason}"),
            Command::Quit => break,
        }
    }

    scheduler.stop().await;
    printer.abort();
    info!("routeviz stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let mut argv = vec!["routeviz", "--config", missing.to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn zero_poll_secs_is_rejected() {
        let err = load_config(&cli(&["--poll-secs", "0"])).unwrap_err();
        assert!(matches!(err, routeviz::RouteVizError::Config(_)));
    }

    #[test]
    fn poll_secs_overrides_config() {
        let config = load_config(&cli(&["--poll-secs", "9"])).unwrap();
        assert_eq!(config.poll_interval_secs, 9);
    }
}
