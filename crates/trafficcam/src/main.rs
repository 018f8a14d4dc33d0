//! trafficcam CLI - traffic-camera triage through a hosted vision model.
//!
//! Sends every camera image in a folder to a chat-completions model and
//! prints whether the camera looks broken, the congestion level and the
//! model's reasoning.
//!
//! # Usage
//!
//! ```bash
//! # Analyze the configured input directory (default: ./Images)
//! trafficcam analyze
//!
//! # Analyze another directory, machine-readable output
//! trafficcam analyze ./captures --format jsonl --output reports.jsonl
//!
//! # View configuration
//! trafficcam config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// trafficcam - congestion level and camera health from a hosted vision model.
#[derive(Parser, Debug)]
#[command(name = "trafficcam")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "TRAFFICCAM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze camera images and print one judgment per image
    Analyze(cli::analyze::AnalyzeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    // The analyze command reloads the config and fails hard on errors.
    let config = match trafficcam_core::Config::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default logging settings. Check your config file with `trafficcam config path`."
            );
            trafficcam_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("trafficcam v{}", trafficcam_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Analyze(args) => cli::analyze::execute(args, cli.config.as_deref()).await,
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref()).await,
    }
}
