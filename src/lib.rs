//! PUBS BURN - Token Risk Scanner Library
//!
//! Decides whether an ERC-20 token on Base is safe to burn, and serves that
//! decision to the PUBS BURN Farcaster Mini App.
//!
//! # Modules
//!
//! - `domain`: Core types and rules (TokenAddress, RiskVerdict, RiskPolicy, BurnLifecycle)
//! - `ports`: Trait abstractions (signal sources, wallet, burner, chain data, notifier)
//! - `adapters`: External implementations (BaseScan, GoPlus, Dexscreener, RPC, API, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Risk aggregator, decision cache and use cases

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
