//! Covalent Balance Client
//!
//! `balances_v2` for one wallet. Items with unparseable contract addresses
//! are dropped here; filtering by type and balance belongs to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::adapters::http::{build_client, send_json};
use crate::domain::TokenAddress;
use crate::ports::{BalanceSource, FetchError, WalletBalance};

#[derive(Debug, Clone)]
pub struct CovalentConfig {
    pub api_url: String,
    pub chain_name: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for CovalentConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.covalenthq.com/v1".to_string(),
            chain_name: "base-mainnet".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    data: Option<BalancesData>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BalancesData {
    #[serde(default)]
    items: Vec<BalanceItem>,
}

#[derive(Debug, Deserialize)]
struct BalanceItem {
    contract_address: String,
    #[serde(default)]
    contract_ticker_symbol: Option<String>,
    #[serde(default)]
    contract_name: Option<String>,
    #[serde(default)]
    contract_decimals: Option<u8>,
    #[serde(default)]
    balance: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CovalentClient {
    config: CovalentConfig,
    http: Client,
}

impl CovalentClient {
    pub fn new(config: CovalentConfig) -> Result<Self, FetchError> {
        let http = build_client(config.timeout)?;
        Ok(Self { config, http })
    }
}

fn into_balances(response: BalancesResponse) -> Result<Vec<WalletBalance>, FetchError> {
    if response.error {
        return Err(FetchError::Status {
            status: 200,
            body: response.error_message.unwrap_or_default(),
        });
    }

    let items = response.data.map(|d| d.items).unwrap_or_default();
    Ok(items
        .into_iter()
        .filter_map(|item| {
            let address = TokenAddress::parse(&item.contract_address).ok()?;
            Some(WalletBalance {
                address,
                symbol: item.contract_ticker_symbol.unwrap_or_default(),
                name: item.contract_name.unwrap_or_default(),
                decimals: item.contract_decimals.unwrap_or(18),
                raw_balance: item.balance.unwrap_or_else(|| "0".to_string()),
                kind: item.kind.unwrap_or_default(),
            })
        })
        .collect())
}

#[async_trait]
impl BalanceSource for CovalentClient {
    async fn balances(&self, wallet: &TokenAddress) -> Result<Vec<WalletBalance>, FetchError> {
        let url = format!(
            "{}/{}/address/{}/balances_v2/",
            self.config.api_url.trim_end_matches('/'),
            self.config.chain_name,
            wallet
        );
        let request = self
            .http
            .get(&url)
            .query(&[("key", self.config.api_key.as_str())]);
        let response: BalancesResponse = send_json(request).await?;
        into_balances(response)
    }
}
