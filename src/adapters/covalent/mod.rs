//! Covalent Adapter
//!
//! Wallet ERC-20 balances for the burnable token listing.

mod client;

pub use client::{CovalentClient, CovalentConfig};
