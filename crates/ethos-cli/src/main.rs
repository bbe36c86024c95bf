use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use ethos_infrastructure::ConfigService;

mod commands;
mod logging;
mod repl;

#[derive(Parser)]
#[command(name = "ethos")]
#[command(about = "ETHOS - Practice standing up to unethical requests", long_about = None)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive practice scenario
    Practice {
        /// Start this scenario id
        #[arg(long, conflicts_with = "query")]
        scenario: Option<String>,
        /// Let the service suggest a scenario for this topic
        #[arg(long)]
        query: Option<String>,
    },
    /// Score a list of per-choice EVS values offline
    Score {
        /// Values in [-3, 3]
        #[arg(required = true, allow_negative_numbers = true)]
        evs: Vec<f64>,
    },
    /// Show the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };

    // `config --init` must work even when the current file does not validate
    if let Commands::Config { init } = cli.command {
        return commands::config::run(&config_service, init);
    }

    let config = config_service.load()?;
    logging::init(&config.log_level, cli.json_logs)?;

    let result = match cli.command {
        Commands::Practice { scenario, query } => {
            commands::practice::run(config, scenario, query).await
        }
        Commands::Score { evs } => commands::score::run(&evs),
        Commands::Config { .. } => Ok(()),
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
        eprintln!("{}", format!("Error: {:#}", e).red());
    }
    result
}
