mod config;
mod monitoring;
mod validation;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use logger::init_tracing;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::monitoring::{CheckScheduler, ExportFormat, PingEngine};

#[derive(Parser)]
#[command(name = "aistatus-service", version, about = "Availability monitor for AI provider APIs")]
struct Cli {
    /// Path to the TOML config file (default: $XDG_CONFIG_HOME/aistatus/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Monitor periodically until interrupted (the default)
    Run,
    /// Run a single check cycle and print the resulting status
    Check {
        /// Print the cycle's history export (json or csv) instead of the
        /// status view
        #[arg(long, value_name = "FORMAT")]
        export: Option<ExportFormat>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_deref())?;
    debug!("{config}");

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&config).await,
        Command::Check { export } => check(&config, export).await,
    }
}

fn build_engine(config: &Config) -> Result<Arc<PingEngine>> {
    let engine = Arc::new(PingEngine::new()?);
    engine.add_endpoints(config.custom_endpoints.iter().map(|e| (e.name.as_str(), e.url.as_str())));
    Ok(engine)
}

async fn run(config: &Config) -> Result<()> {
    let engine = build_engine(config)?;
    let mut transitions = engine.subscribe();

    let mut scheduler = CheckScheduler::new(engine.clone());
    scheduler.start(Duration::from_secs(config.check_interval_seconds));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            transition = transitions.recv() => match transition {
                Ok(transition) => {
                    if config.notifications_enabled {
                        info!(
                            previous = %transition.previous,
                            current = %transition.current,
                            "{}", transition.headline()
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "missed status transitions"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("shutting down");
    scheduler.stop();
    Ok(())
}

async fn check(config: &Config, export: Option<ExportFormat>) -> Result<()> {
    let engine = build_engine(config)?;
    engine.check_now().await;

    let output = match export {
        Some(format) => engine.export_logs(format)?,
        None => serde_json::to_string_pretty(&engine.status())?,
    };
    println!("{output}");

    Ok(())
}
