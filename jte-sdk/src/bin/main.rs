// CLI tool for the JTE token
//
// Runs the configured token workflow end to end, or any single step of it,
// against devnet (or any cluster) and prints explorer links for the results.

mod commands;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jte_sdk::config::{JteConfig, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jte")]
#[command(about = "JTE token CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "jte.toml")]
    config: String,

    /// RPC URL to connect to (overrides the config file)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Path to wallet keypair file (overrides the config file)
    #[arg(long)]
    wallet: Option<String>,

    /// Override log level
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full configured workflow
    Run(commands::run::RunCmd),

    /// Token operations
    Token(commands::token::TokenCmd),

    /// Token metadata operations
    Metadata(commands::metadata::MetadataCmd),

    /// Payer wallet operations
    Wallet(commands::wallet::WalletCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = JteConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config))?;

    if let Some(rpc_url) = cli.rpc_url {
        config.cluster.rpc_url = rpc_url;
    }
    if let Some(wallet) = cli.wallet {
        config.identity.keypair_path = wallet;
        config.identity.env_var = None;
    }
    if let Some(log_level) = cli.log_level {
        config.logging.level = log_level;
    }

    init_logging(&config.logging);
    if !Path::new(&cli.config).exists() {
        commands::utils::warn(&format!(
            "Config file {} not found, using defaults",
            cli.config
        ));
    }

    match cli.command {
        Commands::Run(cmd) => commands::run::execute(cmd, config).await,
        Commands::Token(cmd) => commands::token::execute(cmd, config).await,
        Commands::Metadata(cmd) => commands::metadata::execute(cmd, config).await,
        Commands::Wallet(cmd) => commands::wallet::execute(cmd, config).await,
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("jte_sdk={},jte={}", logging.level, logging.level).into());

    if logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
