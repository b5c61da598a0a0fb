//! Market Data Adapters
//!
//! - Dexscreener: price and pool depth for the liquidity signal
//! - CoinGecko: batch USD prices for the wallet token listing

mod coingecko;
mod dexscreener;

pub use coingecko::{CoinGeckoClient, CoinGeckoConfig};
pub use dexscreener::{DexscreenerClient, DexscreenerConfig};
