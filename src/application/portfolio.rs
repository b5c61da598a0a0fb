//! Portfolio Service
//!
//! Lists the ERC-20 holdings a wallet could burn: fungible tokens with a
//! positive balance that are not on the blocklist, priced in USD where a
//! quote exists.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::U256;
use serde::Serialize;

use super::classifier::Blocklist;
use crate::domain::calldata;
use crate::domain::TokenAddress;
use crate::ports::{BalanceSource, FetchError, PriceSource, WalletBalance};

/// Indexer type for fungible tokens
const KIND_CRYPTOCURRENCY: &str = "cryptocurrency";

const LOGO_URL_PREFIX: &str = "https://assets-cdn.trustwallet.com/blockchains/ethereum/assets";

/// One row of the burnable token listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnableToken {
    pub address: TokenAddress,
    pub symbol: String,
    pub name: String,
    pub logo: String,
    /// Balance scaled by the token's decimals
    pub balance: f64,
    pub price_usd: Option<f64>,
    pub value_usd: Option<f64>,
}

pub fn logo_url(token: &TokenAddress) -> String {
    format!("{}/{}/logo.png", LOGO_URL_PREFIX, token)
}

pub struct PortfolioService {
    balances: Arc<dyn BalanceSource>,
    prices: Arc<dyn PriceSource>,
    blocklist: Blocklist,
}

impl PortfolioService {
    pub fn new(
        balances: Arc<dyn BalanceSource>,
        prices: Arc<dyn PriceSource>,
        blocklist: Blocklist,
    ) -> Self {
        Self {
            balances,
            prices,
            blocklist,
        }
    }

    /// Burnable holdings of `wallet`, in indexer order.
    ///
    /// A failed balance lookup is an error; a failed price lookup only
    /// leaves prices empty.
    pub async fn list_burnable(
        &self,
        wallet: &TokenAddress,
    ) -> Result<Vec<BurnableToken>, FetchError> {
        let holdings: Vec<(WalletBalance, U256)> = self
            .balances
            .balances(wallet)
            .await?
            .into_iter()
            .filter(|b| b.kind == KIND_CRYPTOCURRENCY)
            .filter(|b| !self.blocklist.contains(&b.address))
            .filter_map(|b| {
                let raw = b.raw_balance.trim().parse::<U256>().ok()?;
                (!raw.is_zero()).then_some((b, raw))
            })
            .collect();

        if holdings.is_empty() {
            return Ok(Vec::new());
        }

        let tokens: Vec<TokenAddress> = holdings.iter().map(|(b, _)| b.address.clone()).collect();
        let prices = match self.prices.usd_prices(&tokens).await {
            Ok(prices) => prices,
            Err(e) => {
                tracing::warn!("Price lookup for {} tokens failed: {}", tokens.len(), e);
                HashMap::new()
            }
        };

        let rows: Vec<BurnableToken> = holdings
            .into_iter()
            .map(|(holding, raw)| {
                let balance = calldata::format_units(raw, holding.decimals);
                let price_usd = prices.get(&holding.address).copied();
                BurnableToken {
                    logo: logo_url(&holding.address),
                    address: holding.address,
                    symbol: holding.symbol,
                    name: holding.name,
                    balance,
                    price_usd,
                    value_usd: price_usd.map(|p| p * balance),
                }
            })
            .collect();

        tracing::info!("Wallet {}: {} burnable tokens", wallet, rows.len());
        Ok(rows)
    }
}
