//! Domain Layer - Core types and rules for the PUBS BURN scanner
//!
//! Pure types with no I/O. All external interactions happen through the
//! ports layer.
//!
//! - `token`: normalized ERC-20 addresses
//! - `signal`: per-fetcher outputs (`SignalResult`, honeypot flags, market data)
//! - `verdict`: the accept/reject decision for a token
//! - `risk_policy`: thresholds applied after the concurrent fetches
//! - `burn_lifecycle`: approve+burn state machine
//! - `leaderboard`: burn-count ranking
//! - `calldata`: ERC-20 and burner ABI bindings

pub mod token;
pub mod signal;
pub mod verdict;
pub mod risk_policy;
pub mod burn_lifecycle;
pub mod leaderboard;
pub mod calldata;

pub use token::{TokenAddress, TokenAddressError};
pub use signal::{
    HoneypotFlag, HoneypotReport, MarketData, SignalKind, SignalResult,
    REASON_STABLECOIN_OR_OFFICIAL, REASON_VERIFIED_CONTRACT,
};
pub use verdict::{
    Decision, RiskVerdict, REASON_LOW_LIQUIDITY, REASON_NO_MARKET_DATA, REASON_NO_RISK_SIGNAL,
};
pub use risk_policy::{PolicyOutcome, RiskPolicy, DEFAULT_MAX_SELL_TAX, DEFAULT_MIN_LIQUIDITY_USD};
pub use burn_lifecycle::{BurnEvent, BurnLifecycle, BurnState, LifecycleError};
pub use leaderboard::{rank_burners, BurnLog, LeaderboardEntry, LEADERBOARD_SIZE};
pub use calldata::{CalldataError, FeeQuote};
