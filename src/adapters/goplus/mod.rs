//! GoPlus Adapter
//!
//! Honeypot and tax detection for EVM tokens via the GoPlus token-security API.

mod client;
mod types;

pub use client::{GoPlusClient, GoPlusConfig};
