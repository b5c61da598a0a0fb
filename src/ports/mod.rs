//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Risk signal sources (verification, honeypot, liquidity, metadata)
//! - The wallet provider and the burner contract
//! - Chain data behind the leaderboard and token listing
//! - Outbound notifications

pub mod signals;
pub mod wallet;
pub mod chain_data;
pub mod notifier;
pub mod mocks;

// Re-export main traits and types
pub use signals::{
    FetchError, HoneypotSource, LiquiditySource, MetadataSource, TokenMeta, VerificationSource,
};
pub use wallet::{BurnerPort, TxRequest, WalletError, WalletPort};
pub use chain_data::{BalanceSource, BurnLogSource, PriceSource, WalletBalance};
pub use notifier::{Notifier, NotifyError};
