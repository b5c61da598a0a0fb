//! Chain Data Ports
//!
//! Read-only sources behind the leaderboard and wallet token listing.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::signals::FetchError;
use crate::domain::{BurnLog, TokenAddress};

/// One ERC-20 holding as reported by the balance indexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub address: TokenAddress,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    /// Integer balance in base units, as a decimal string
    pub raw_balance: String,
    /// Indexer classification (`cryptocurrency`, `nft`, `dust`, ...)
    pub kind: String,
}

/// Burn events emitted by the burner contract
#[async_trait]
pub trait BurnLogSource: Send + Sync {
    async fn burn_logs(&self) -> Result<Vec<BurnLog>, FetchError>;
}

/// ERC-20 balances held by a wallet
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn balances(&self, wallet: &TokenAddress) -> Result<Vec<WalletBalance>, FetchError>;
}

/// USD prices keyed by token
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Tokens without a quote are simply absent from the map
    async fn usd_prices(
        &self,
        tokens: &[TokenAddress],
    ) -> Result<HashMap<TokenAddress, f64>, FetchError>;
}
