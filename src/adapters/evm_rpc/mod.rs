//! EVM RPC Adapter
//!
//! `eth_call` client for Base, used for:
//! - ERC-20 `symbol`/`name`/`decimals` shown in scan results
//! - Burner `quoteErc20Fee` before a burn is submitted

mod client;
mod types;

pub use client::{BurnerContract, EvmRpcClient, EvmRpcConfig, EvmRpcError};
