//! Dexscreener Liquidity Client
//!
//! Reads price and pool depth from the Dexscreener token endpoint, using the
//! deepest pair on the configured chain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::adapters::http::{build_client, send_json};
use crate::domain::{MarketData, TokenAddress};
use crate::ports::{FetchError, LiquiditySource};

#[derive(Debug, Clone)]
pub struct DexscreenerConfig {
    pub api_url: String,
    /// Dexscreener chain slug
    pub chain: String,
    pub timeout: Duration,
}

impl Default for DexscreenerConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.dexscreener.com/latest/dex/tokens".to_string(),
            chain: "base".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenPairsResponse {
    #[serde(default)]
    pairs: Option<Vec<Pair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pair {
    #[serde(default)]
    chain_id: String,
    #[serde(default)]
    price_usd: Option<String>,
    #[serde(default)]
    liquidity: Option<Liquidity>,
}

#[derive(Debug, Deserialize)]
struct Liquidity {
    #[serde(default)]
    usd: Option<f64>,
}

impl Pair {
    fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct DexscreenerClient {
    config: DexscreenerConfig,
    http: Client,
}

impl DexscreenerClient {
    pub fn new(config: DexscreenerConfig) -> Result<Self, FetchError> {
        let http = build_client(config.timeout)?;
        Ok(Self { config, http })
    }
}

/// Deepest pair on `chain`; no pairs at all is an empty market, not an error
fn select_market(response: TokenPairsResponse, chain: &str) -> MarketData {
    let best = response
        .pairs
        .unwrap_or_default()
        .into_iter()
        .filter(|p| p.chain_id.eq_ignore_ascii_case(chain))
        .max_by(|a, b| a.liquidity_usd().total_cmp(&b.liquidity_usd()));

    match best {
        Some(pair) => MarketData {
            price_usd: pair
                .price_usd
                .as_deref()
                .and_then(|p| p.parse::<f64>().ok())
                .filter(|p| *p > 0.0),
            liquidity_usd: pair.liquidity_usd(),
        },
        None => MarketData::empty(),
    }
}

#[async_trait]
impl LiquiditySource for DexscreenerClient {
    async fn market_data(&self, token: &TokenAddress) -> Result<MarketData, FetchError> {
        let url = format!("{}/{}", self.config.api_url.trim_end_matches('/'), token);
        let response: TokenPairsResponse = send_json(self.http.get(&url)).await?;
        Ok(select_market(response, &self.config.chain))
    }
}
