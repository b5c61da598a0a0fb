//! GoPlus Honeypot Client
//!
//! Token-security lookup that reports honeypot, sell restrictions, mint
//! authority, hidden ownership and buy/sell tax for an EVM token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::types::{flag, tax, TokenSecurityResponse};
use crate::adapters::http::{build_client, send_json};
use crate::domain::{HoneypotReport, TokenAddress};
use crate::ports::{FetchError, HoneypotSource};

/// GoPlus success code
const CODE_OK: i64 = 1;

#[derive(Debug, Clone)]
pub struct GoPlusConfig {
    /// Endpoint without the chain id suffix
    pub api_url: String,
    pub chain_id: u64,
    pub timeout: Duration,
}

impl Default for GoPlusConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.gopluslabs.io/api/v1/token_security".to_string(),
            chain_id: 8453,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoPlusClient {
    config: GoPlusConfig,
    http: Client,
}

impl GoPlusClient {
    pub fn new(config: GoPlusConfig) -> Result<Self, FetchError> {
        let http = build_client(config.timeout)?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.chain_id
        )
    }
}

pub(crate) fn parse_report(
    token: &TokenAddress,
    response: TokenSecurityResponse,
) -> Result<HoneypotReport, FetchError> {
    if response.code != CODE_OK {
        return Err(FetchError::Status {
            status: 200,
            body: format!("goplus code {}: {}", response.code, response.message),
        });
    }

    let security = response
        .result
        .and_then(|mut result| result.remove(token.as_str()))
        .ok_or_else(|| FetchError::NotFound(format!("no security data for {}", token)))?;

    Ok(HoneypotReport {
        is_honeypot: flag(&security.is_honeypot),
        cannot_sell: flag(&security.cannot_sell_all),
        mint_enabled: flag(&security.is_mintable),
        hidden_owner: flag(&security.hidden_owner),
        buy_tax: tax(&security.buy_tax),
        sell_tax: tax(&security.sell_tax),
    })
}

#[async_trait]
impl HoneypotSource for GoPlusClient {
    async fn check(&self, token: &TokenAddress) -> Result<HoneypotReport, FetchError> {
        let request = self
            .http
            .get(self.endpoint())
            .query(&[("contract_addresses", token.as_str())]);
        let response: TokenSecurityResponse = send_json(request).await?;
        let report = parse_report(token, response)?;
        tracing::debug!("GoPlus report for {}: {:?}", token, report);
        Ok(report)
    }
}
