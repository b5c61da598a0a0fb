//! Risk Verdict
//!
//! The single accept/reject decision produced for a token. Verdicts are
//! immutable; a later scan produces a new verdict rather than editing an old
//! one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::{HoneypotReport, MarketData};
use super::token::TokenAddress;

/// Reason attached when no fetcher raised anything
pub const REASON_NO_RISK_SIGNAL: &str = "no_risk_signal";

/// Reason attached when pool depth is below the configured minimum
pub const REASON_LOW_LIQUIDITY: &str = "lowLiquidity";

/// Reason attached when the DEX aggregator has no price or an empty pool
pub const REASON_NO_MARKET_DATA: &str = "no_market_data";

/// Overall outcome of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Token may be burned
    Allow,
    /// Token must not be burned
    Block,
    /// Signals were unavailable; caller must warn explicitly
    Unknown,
}

impl Decision {
    pub fn is_conclusive(&self) -> bool {
        !matches!(self, Decision::Unknown)
    }
}

/// Verdict for one token at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskVerdict {
    pub token: TokenAddress,
    pub decision: Decision,
    /// Ordered, most significant first
    pub reasons: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
    /// Honeypot report that informed the verdict, if it was fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honeypot: Option<HoneypotReport>,
    /// Market data that informed the verdict, if it was fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<MarketData>,
}

impl RiskVerdict {
    pub fn new(token: TokenAddress, decision: Decision, reasons: Vec<String>) -> Self {
        Self {
            token,
            decision,
            reasons,
            evaluated_at: Utc::now(),
            honeypot: None,
            liquidity: None,
        }
    }

    pub fn block(token: TokenAddress, reason: impl Into<String>) -> Self {
        Self::new(token, Decision::Block, vec![reason.into()])
    }

    pub fn unknown(token: TokenAddress, reason: impl Into<String>) -> Self {
        Self::new(token, Decision::Unknown, vec![reason.into()])
    }

    pub fn with_honeypot(mut self, report: Option<HoneypotReport>) -> Self {
        self.honeypot = report;
        self
    }

    pub fn with_liquidity(mut self, data: Option<MarketData>) -> Self {
        self.liquidity = data;
        self
    }

    pub fn has_reason(&self, reason: &str) -> bool {
        self.reasons.iter().any(|r| r == reason)
    }

    /// First (primary) reason
    pub fn primary_reason(&self) -> Option<&str> {
        self.reasons.first().map(String::as_str)
    }

    /// Whether the token is excluded from burning outright (blocklist or
    /// verified contract), as opposed to blocked by a risk flag
    pub fn is_excluded(&self) -> bool {
        self.decision == Decision::Block
            && matches!(
                self.primary_reason(),
                Some(super::signal::REASON_STABLECOIN_OR_OFFICIAL)
                    | Some(super::signal::REASON_VERIFIED_CONTRACT)
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{REASON_STABLECOIN_OR_OFFICIAL, REASON_VERIFIED_CONTRACT};

    fn token() -> TokenAddress {
        TokenAddress::parse("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb").unwrap()
    }

    #[test]
    fn test_decision_conclusive() {
        assert!(Decision::Allow.is_conclusive());
        assert!(Decision::Block.is_conclusive());
        assert!(!Decision::Unknown.is_conclusive());
    }

    #[test]
    fn test_excluded_only_for_blocklist_and_verified() {
        assert!(RiskVerdict::block(token(), REASON_STABLECOIN_OR_OFFICIAL).is_excluded());
        assert!(RiskVerdict::block(token(), REASON_VERIFIED_CONTRACT).is_excluded());
        assert!(!RiskVerdict::block(token(), "honeypot").is_excluded());
        assert!(!RiskVerdict::unknown(token(), REASON_VERIFIED_CONTRACT).is_excluded());
    }

    #[test]
    fn test_serializes_camel_case() {
        let verdict = RiskVerdict::new(
            token(),
            Decision::Allow,
            vec![REASON_NO_RISK_SIGNAL.to_string()],
        );
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["decision"], "allow");
        assert!(json.get("evaluatedAt").is_some());
        assert!(json.get("honeypot").is_none());
    }
}
