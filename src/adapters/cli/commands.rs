//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the PUBS BURN scanner.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::api;
use crate::application::{ScanReport, ServiceContext};
use crate::config::{load_config, Config};
use crate::domain::TokenAddress;

const DEFAULT_CONFIG: &str = "config/default.toml";

/// PUBS BURN - token risk scanner and burn service for Base
#[derive(Parser, Debug)]
#[command(
    name = "pubs-burn",
    version = env!("CARGO_PKG_VERSION"),
    about = "Token risk scanner and burn service for Base",
    long_about = "Classifies ERC-20 tokens as safe or unsafe to burn by combining a \
                  stablecoin blocklist, source verification, honeypot detection and \
                  DEX liquidity, and serves the result to the PUBS BURN Mini App."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve(ServeCmd),

    /// Classify one token
    Scan(ScanCmd),

    /// Show the top burners
    Leaderboard(LeaderboardCmd),

    /// List the burnable tokens held by a wallet
    Tokens(TokensCmd),
}

impl Command {
    pub fn config_path(&self) -> &Path {
        match self {
            Command::Serve(cmd) => &cmd.config,
            Command::Scan(cmd) => &cmd.config,
            Command::Leaderboard(cmd) => &cmd.config,
            Command::Tokens(cmd) => &cmd.config,
        }
    }
}

/// Start the HTTP API
#[derive(Parser, Debug)]
pub struct ServeCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override the bind address from the config
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,
}

/// Classify one token
#[derive(Parser, Debug)]
pub struct ScanCmd {
    /// Token contract address
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Print the raw JSON report
    #[arg(long)]
    pub json: bool,
}

/// Show the top burners
#[derive(Parser, Debug)]
pub struct LeaderboardCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// List burnable tokens
#[derive(Parser, Debug)]
pub struct TokensCmd {
    /// Wallet address
    #[arg(value_name = "WALLET")]
    pub wallet: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = load(app.command.config_path())?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    let ctx = ServiceContext::from_config(&config).context("Failed to build services")?;

    match app.command {
        Command::Serve(cmd) => serve_command(cmd, &config, ctx).await,
        Command::Scan(cmd) => scan_command(cmd, &ctx).await,
        Command::Leaderboard(_) => leaderboard_command(&ctx).await,
        Command::Tokens(cmd) => tokens_command(cmd, &ctx).await,
    }
}

/// Load configuration, expanding `~` in the path
fn load(path: &Path) -> Result<Config> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).to_string();
    load_config(&expanded).with_context(|| format!("Failed to load configuration from {}", expanded))
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        config_level
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log level")?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Handle serve command
async fn serve_command(cmd: ServeCmd, config: &Config, ctx: ServiceContext) -> Result<()> {
    let addr = match cmd.bind {
        Some(addr) => addr,
        None => config
            .server
            .bind
            .parse()
            .context("Invalid server.bind address")?,
    };

    tracing::info!(
        "Starting PUBS BURN API (chain {}, {} blocklisted tokens)",
        config.chain.chain_id,
        config.scan.blocklist.len()
    );

    api::serve(Arc::new(ctx), addr)
        .await
        .context("HTTP server failed")?;

    tracing::info!("PUBS BURN API stopped");
    Ok(())
}

/// Handle scan command
async fn scan_command(cmd: ScanCmd, ctx: &ServiceContext) -> Result<()> {
    let report = ctx.scan.scan(&cmd.token).await.context("Scan rejected")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match report {
        ScanReport::Excluded { reason, .. } => {
            println!("{}: EXCLUDED ({})", cmd.token.trim().to_lowercase(), reason);
        }
        ScanReport::Complete(result) => {
            println!("Token:     {}", result.token);
            if !result.meta.symbol.is_empty() {
                println!("Symbol:    {} ({})", result.meta.symbol, result.meta.name);
            }
            println!("Decision:  {:?}", result.decision);
            println!("Reasons:   {}", result.reasons.join(", "));
            if let Some(liquidity) = result.liquidity {
                println!("Liquidity: ${:.2}", liquidity.liquidity_usd);
                if let Some(price) = liquidity.price_usd {
                    println!("Price:     ${}", price);
                }
            }
        }
    }

    Ok(())
}

/// Handle leaderboard command
async fn leaderboard_command(ctx: &ServiceContext) -> Result<()> {
    let service = ctx
        .leaderboard
        .as_ref()
        .context("No burner contract configured (set BURNER_CONTRACT_ADDRESS)")?;
    let rows = service
        .top_burners()
        .await
        .context("Failed to fetch burn logs")?;

    if rows.is_empty() {
        println!("No burns recorded yet");
        return Ok(());
    }

    println!("{:>4}  {:<42}  {:>6}", "#", "WALLET", "BURNS");
    for (rank, row) in rows.iter().enumerate() {
        println!("{:>4}  {:<42}  {:>6}", rank + 1, row.wallet, row.score);
    }
    Ok(())
}

/// Handle tokens command
async fn tokens_command(cmd: TokensCmd, ctx: &ServiceContext) -> Result<()> {
    let wallet = TokenAddress::parse(&cmd.wallet).context("Invalid wallet address")?;
    let rows = ctx
        .portfolio
        .list_burnable(&wallet)
        .await
        .context("Failed to list wallet balances")?;

    if rows.is_empty() {
        println!("No burnable tokens in {}", wallet);
        return Ok(());
    }

    for row in rows {
        let value = row
            .value_usd
            .map(|v| format!("${:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:>20.4}  {:>12}  {}",
            row.symbol, row.balance, value, row.address
        );
    }
    Ok(())
}
