//! BaseScan Adapter
//!
//! Etherscan-compatible explorer API for Base. Backs both the verification
//! signal and the burn leaderboard.

mod client;
mod types;

pub use client::{BaseScanClient, BaseScanConfig};
