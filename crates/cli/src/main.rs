//! SousChef CLI: the main entry point.
//!
//! Commands:
//! - `cook`   : Assemble context from the configured menu
//! - `trace`  : Show how a token is produced
//! - `menu`   : List configured recipes and pantry values
//! - `config` : Print the effective configuration

use anyhow::Context;
use clap::{Parser, Subcommand};
use souschef_config::{LogFormat, SousChefConfig};
use std::path::PathBuf;

mod commands;
mod menu;

#[derive(Parser)]
#[command(
    name = "souschef",
    about = "SousChef — budget-aware context assembly",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.souschef/config.toml)
    #[arg(short, long, global = true, env = "SOUSCHEF_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Cook an order of tokens into context
    Cook {
        /// Tokens to serve, optionally as TOKEN:DETAIL (default: whole menu)
        items: Vec<String>,

        /// Token budget (overrides the config)
        #[arg(short, long)]
        budget: Option<usize>,

        /// Explain every serve/compress/drop decision
        #[arg(short, long)]
        explain: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the lineage of a token without cooking it
    Trace {
        token: String,
    },

    /// List configured recipes and pantry values
    Menu,

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let mut config = SousChefConfig::load_from(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => SousChefConfig::load().context("loading default config")?,
    };

    // Initialize tracing; stdout is reserved for cooked output
    let filter = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }

    match cli.command {
        Commands::Cook {
            items,
            budget,
            explain,
            json,
        } => {
            let options = commands::cook::CookOptions {
                items,
                budget,
                explain,
                json,
            };
            commands::cook::run(&config, options).await?
        }
        Commands::Trace { token } => commands::trace::run(&config, &token)?,
        Commands::Menu => commands::menu::run(&config)?,
        Commands::Config => commands::config_cmd::show(&config, cli.config.as_deref()),
    }

    Ok(())
}
