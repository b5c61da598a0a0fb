//! CoinGecko Price Client
//!
//! Batch USD prices for ERC-20 contracts on one platform.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::adapters::http::{build_client, send_json};
use crate::domain::TokenAddress;
use crate::ports::{FetchError, PriceSource};

#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    pub api_url: String,
    /// Asset platform id
    pub platform: String,
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.coingecko.com/api/v3/simple/token_price".to_string(),
            platform: "base".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    usd: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    config: CoinGeckoConfig,
    http: Client,
}

impl CoinGeckoClient {
    pub fn new(config: CoinGeckoConfig) -> Result<Self, FetchError> {
        let http = build_client(config.timeout)?;
        Ok(Self { config, http })
    }
}

fn collect_prices(response: HashMap<String, Quote>) -> HashMap<TokenAddress, f64> {
    response
        .into_iter()
        .filter_map(|(address, quote)| {
            let token = TokenAddress::parse(&address).ok()?;
            Some((token, quote.usd?))
        })
        .collect()
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn usd_prices(
        &self,
        tokens: &[TokenAddress],
    ) -> Result<HashMap<TokenAddress, f64>, FetchError> {
        if tokens.is_empty() {
            return Ok(HashMap::new());
        }

        let addresses = tokens
            .iter()
            .map(TokenAddress::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.platform
        );
        let request = self.http.get(&url).query(&[
            ("contract_addresses", addresses.as_str()),
            ("vs_currencies", "usd"),
        ]);

        let response: HashMap<String, Quote> = send_json(request).await?;
        Ok(collect_prices(response))
    }
}
