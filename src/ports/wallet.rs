//! Wallet and Burner Ports
//!
//! The wallet provider signs and submits; this crate only builds calldata and
//! drives the lifecycle.

use alloy::primitives::U256;
use async_trait::async_trait;
use thiserror::Error;

use super::signals::FetchError;
use crate::domain::{FeeQuote, TokenAddress};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("User rejected the request: {0}")]
    Rejected(String),

    #[error("Wallet provider unavailable: {0}")]
    Unavailable(String),

    #[error("Wallet RPC error: {0}")]
    Rpc(String),
}

/// Unsigned transaction handed to the wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub to: TokenAddress,
    pub data: Vec<u8>,
    /// Native value in wei
    pub value: U256,
}

#[async_trait]
pub trait WalletPort: Send + Sync {
    /// Connected accounts, first is the active one
    async fn request_accounts(&self) -> Result<Vec<TokenAddress>, WalletError>;

    /// Submit a transaction from `from`, returning its hash
    async fn send_transaction(
        &self,
        from: &TokenAddress,
        tx: TxRequest,
    ) -> Result<String, WalletError>;

    /// Wait for the receipt; `Ok(false)` means the transaction reverted
    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<bool, WalletError>;
}

/// Read side of the burner contract
#[async_trait]
pub trait BurnerPort: Send + Sync {
    async fn quote_erc20_fee(
        &self,
        token: &TokenAddress,
        amount: U256,
    ) -> Result<FeeQuote, FetchError>;
}
