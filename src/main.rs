use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use nexus_agent::command::parse_command;
use nexus_agent::config::Config;
use nexus_agent::service::SharedNexus;

/// Nexus agent - causal fact graph and command decomposition
#[derive(Parser, Debug)]
#[command(name = "nexus-agent", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Agent ID (overrides config)
    #[arg(short, long)]
    id: Option<String>,

    /// Default context ID (overrides config)
    #[arg(short = 'x', long)]
    context: Option<String>,

    /// Log level (overrides config)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Run a single command through decomposition and the graph, then exit.
    /// Without it, newline-delimited JSON commands are read from stdin.
    #[arg(short = 'e', long)]
    command: Option<String>,
}

fn load_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(id) = &args.id {
        config.agent_id = id.clone();
    }
    if let Some(context) = &args.context {
        config.default_context_id = context.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args)?;

    // Logs go to stderr; stdout carries reports only
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(config.tracing_level()?)
        .with_writer(std::io::stderr)
        .init();

    info!(
        agent_id = %config.agent_id,
        default_context = %config.default_context_id,
        "nexus agent starting"
    );

    let nexus = SharedNexus::from_config(config);

    if let Some(command) = &args.command {
        let result = nexus.grok(command, None).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_command(trimmed.as_bytes()) {
            Ok(cmd) => {
                let report = nexus.handle(&cmd).await;
                println!("{}", serde_json::to_string(&report)?);
            }
            Err(e) => {
                warn!(error = %e, "failed to parse command");
                println!("{}", serde_json::json!({"error": e.to_string()}));
            }
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}
