//! Colony CLI - bootstrap and script colonies from the terminal
//!
//! This CLI lets operators:
//! - Bootstrap the meta colony from a configuration file
//! - Replay permission scripts against a fresh colony
//! - Inspect and initialize configuration
//! - Look up the deterministic actor ids scripts use

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;
mod script;

use commands::config::ConfigCommands;
use output::OutputFormat;

/// Colony CLI application
#[derive(Parser)]
#[command(name = "colony")]
#[command(about = "Colony - hierarchical domain-scoped authorization", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "COLONY_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Log level
    #[arg(long, env = "COLONY_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "COLONY_LOG_JSON", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Bootstrap the meta colony and print the result
    Bootstrap,

    /// Run a step script against a freshly bootstrapped colony
    Run {
        /// Path to the script (TOML)
        script: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show the actor ids derived from labels
    Actor {
        /// Actor labels
        #[arg(required = true)]
        labels: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Bootstrap => commands::bootstrap::execute(config_path, cli.output),
        Commands::Run { script } => commands::run::execute(config_path, &script, cli.output),
        Commands::Config { command } => commands::config::execute(command, config_path),
        Commands::Actor { labels } => commands::actor::execute(&labels, cli.output),
    }
}
