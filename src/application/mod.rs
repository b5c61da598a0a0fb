//! Application Layer
//!
//! Use cases built on the domain and ports:
//! - `classifier`: risk aggregator (blocklist, verification, honeypot, liquidity)
//! - `decision_cache`: TTL cache with in-flight dedup in front of the aggregator
//! - `scan`, `burn_flow`, `webhook_relay`, `leaderboard`, `portfolio`: services
//! - `context`: wiring from `Config` to shared services

pub mod classifier;
pub mod decision_cache;
pub mod scan;
pub mod burn_flow;
pub mod webhook_relay;
pub mod leaderboard;
pub mod portfolio;
pub mod manifest;
pub mod context;

pub use classifier::{Blocklist, RiskAggregator, SignalSources, DEFAULT_FETCH_TIMEOUT};
pub use decision_cache::{CacheEntry, CacheSettings, CacheStats, DecisionCache};
pub use scan::{ScanError, ScanReport, ScanResult, ScanService};
pub use burn_flow::{BurnError, BurnFlow, BurnReceipt, BurnRequest, DEFAULT_BURN_SUMMARY};
pub use webhook_relay::{
    sign_payload, FarcasterEvent, WebhookError, WebhookRelay, WebhookReply, SIGNATURE_HEADER,
};
pub use leaderboard::LeaderboardService;
pub use portfolio::{BurnableToken, PortfolioService};
pub use manifest::MiniAppManifest;
pub use context::{BurnerHandle, ContextError, ServiceContext};
