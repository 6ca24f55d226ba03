//! MiniAgent CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Run the ReAct agent on a prompt or a built-in example
//! - `examples` — List the built-in example prompts
//! - `config`   — Show the effective configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "miniagent",
    about = "MiniAgent — a ReAct agent with web search and a calculator",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.miniagent/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent on a prompt
    Run {
        /// The request to answer; defaults to a built-in example
        prompt: Option<String>,

        /// Which built-in example to run when no prompt is given
        #[arg(short, long, default_value_t = 0)]
        example: usize,
    },

    /// List the built-in example prompts
    Examples,

    /// Show the effective configuration (secrets redacted)
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Keys may live in a local .env file.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Run { prompt, example } => {
            commands::run::run(config_path, prompt, example).await?
        }
        Commands::Examples => commands::examples::list(),
        Commands::Config => commands::config_cmd::show(config_path)?,
    }

    Ok(())
}
