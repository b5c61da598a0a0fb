//! Signal Ports
//!
//! One trait per external risk signal. Implementations hold no shared mutable
//! state; the aggregator owns timeouts and turns every error into an
//! `Unknown` signal.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{HoneypotReport, MarketData, TokenAddress};

/// Failure of a single external lookup
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl FetchError {
    /// Short machine-readable label, used in logs and `Unknown` reasons
    pub fn label(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::Http(_) => "http_error",
            FetchError::Status { .. } => "bad_status",
            FetchError::Parse(_) => "parse_error",
            FetchError::NotFound(_) => "not_found",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(Duration::ZERO)
        } else if e.is_decode() {
            FetchError::Parse(e.to_string())
        } else {
            FetchError::Http(e.to_string())
        }
    }
}

/// ERC-20 metadata shown alongside a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

impl TokenMeta {
    /// Placeholder used when the chain cannot be reached
    pub fn fallback() -> Self {
        Self {
            symbol: String::new(),
            name: String::new(),
            decimals: 18,
        }
    }
}

/// Contract source verification (block explorer)
#[async_trait]
pub trait VerificationSource: Send + Sync {
    /// `Ok(true)` when the contract has published source
    async fn is_verified(&self, token: &TokenAddress) -> Result<bool, FetchError>;
}

/// Honeypot and tax detector
#[async_trait]
pub trait HoneypotSource: Send + Sync {
    async fn check(&self, token: &TokenAddress) -> Result<HoneypotReport, FetchError>;
}

/// DEX price and liquidity oracle
#[async_trait]
pub trait LiquiditySource: Send + Sync {
    async fn market_data(&self, token: &TokenAddress) -> Result<MarketData, FetchError>;
}

/// On-chain ERC-20 metadata
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn metadata(&self, token: &TokenAddress) -> Result<TokenMeta, FetchError>;
}
