//! Interactive console for the unified search backend.
//!
//! Stdout carries the console itself; tracing output goes to stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use unisearch::{Console, ConsoleConfig, SystemDesktop, logging};
use unisearch_client::HttpBackend;

/// Search Exa, Google and YouTube at once from the terminal.
#[derive(Parser)]
#[command(name = "unisearch", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend API root, e.g. `http://127.0.0.1:5000/api`.
    #[arg(long)]
    base_url: Option<String>,

    /// Directory exported files are written to.
    #[arg(long)]
    download_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the interactive console (default).
    Run,

    /// Write the effective configuration to the config file and exit.
    InitConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(ConsoleConfig::default_config_path);
    let mut config = ConsoleConfig::load_or_default(&config_path)?;
    if let Some(base_url) = cli.base_url {
        config.backend.base_url = base_url;
    }
    if let Some(dir) = cli.download_dir {
        config.export.directory = Some(dir);
    }
    config.validate()?;

    let _log_guard = logging::init_tracing(&config.logging);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config).await,
        Command::InitConfig => {
            config.save_to_file(&config_path)?;
            println!("Wrote {}", config_path.display());
            Ok(())
        }
    }
}

async fn run(config: ConsoleConfig) -> anyhow::Result<()> {
    let backend = Arc::new(HttpBackend::new(config.backend.clone())?);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = %backend.config().base_url,
        downloads = %config.download_dir().display(),
        "unisearch starting"
    );
    let desktop = Arc::new(SystemDesktop);
    let mut console = Console::new(backend, desktop, &config, tokio::io::stdout());
    console.start_favorites_sync();

    console
        .run(BufReader::new(tokio::io::stdin()))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "console exited with error");
            anyhow::anyhow!("console failed: {e}")
        })?;

    tracing::info!("unisearch shut down cleanly");
    Ok(())
}
