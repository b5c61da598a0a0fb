//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - BaseScan: source verification and burner event logs
//! - GoPlus: honeypot and tax detection
//! - Market Data: Dexscreener liquidity, CoinGecko prices
//! - EVM RPC: ERC-20 metadata and burner fee quotes
//! - Covalent: wallet balances
//! - Discord: burn notifications
//! - API: axum HTTP server
//! - CLI: Command-line interface handlers

pub mod http;
pub mod basescan;
pub mod goplus;
pub mod market_data;
pub mod evm_rpc;
pub mod covalent;
pub mod discord;
pub mod api;
pub mod cli;

pub use basescan::BaseScanClient;
pub use goplus::GoPlusClient;
pub use market_data::{CoinGeckoClient, DexscreenerClient};
pub use evm_rpc::{BurnerContract, EvmRpcClient};
pub use covalent::CovalentClient;
pub use discord::DiscordNotifier;
pub use cli::CliApp;
