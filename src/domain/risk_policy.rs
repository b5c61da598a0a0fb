//! Risk Policy
//!
//! Pure decision rules applied once the honeypot and liquidity signals are in.
//! Blocklist and verification short-circuits happen earlier in the
//! aggregator; this module only sees tokens that passed both.

use serde::{Deserialize, Serialize};

use super::signal::{SignalKind, SignalResult};
use super::verdict::{Decision, REASON_LOW_LIQUIDITY, REASON_NO_MARKET_DATA, REASON_NO_RISK_SIGNAL};

/// Default minimum pool depth before a token is annotated `lowLiquidity`
pub const DEFAULT_MIN_LIQUIDITY_USD: f64 = 30_000.0;

/// Default sell tax ceiling (fraction) before `highSellTax` is raised
pub const DEFAULT_MAX_SELL_TAX: f64 = 0.10;

/// Thresholds for the post-fetch decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicy {
    /// Pool depth below which a token is annotated, not blocked
    pub min_liquidity_usd: f64,
    /// Sell tax fraction above which `highSellTax` is raised
    pub max_sell_tax: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            min_liquidity_usd: DEFAULT_MIN_LIQUIDITY_USD,
            max_sell_tax: DEFAULT_MAX_SELL_TAX,
        }
    }
}

/// Outcome of the policy before it is stamped into a `RiskVerdict`
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyOutcome {
    pub decision: Decision,
    pub reasons: Vec<String>,
}

impl RiskPolicy {
    pub fn new(min_liquidity_usd: f64, max_sell_tax: f64) -> Self {
        Self {
            min_liquidity_usd,
            max_sell_tax,
        }
    }

    /// Combine the concurrently fetched honeypot and liquidity signals.
    ///
    /// Precedence: honeypot flags block; otherwise low or missing liquidity
    /// annotates an `Allow`; otherwise `Allow` with `no_risk_signal`.
    /// Unavailable signals are appended as `<signal>_unavailable` and only
    /// change the decision when both are unavailable.
    pub fn evaluate(&self, honeypot: &SignalResult, liquidity: &SignalResult) -> PolicyOutcome {
        let mut unavailable = Vec::new();
        if !honeypot.is_available() {
            unavailable.push(SignalKind::Honeypot.unavailable_reason());
        }
        if !liquidity.is_available() {
            unavailable.push(SignalKind::Liquidity.unavailable_reason());
        }

        if !honeypot.is_available() && !liquidity.is_available() {
            return PolicyOutcome {
                decision: Decision::Unknown,
                reasons: unavailable,
            };
        }

        if let SignalResult::HoneypotFlag { flags, .. } = honeypot {
            if !flags.is_empty() {
                let mut reasons: Vec<String> =
                    flags.iter().map(|f| f.reason().to_string()).collect();
                reasons.extend(unavailable);
                return PolicyOutcome {
                    decision: Decision::Block,
                    reasons,
                };
            }
        }

        let mut reasons = Vec::new();
        if let SignalResult::LiquidityInfo(data) = liquidity {
            if !data.has_market() {
                reasons.push(REASON_NO_MARKET_DATA.to_string());
            }
            if data.liquidity_usd < self.min_liquidity_usd {
                reasons.push(REASON_LOW_LIQUIDITY.to_string());
            }
        }

        if reasons.is_empty() {
            reasons.push(REASON_NO_RISK_SIGNAL.to_string());
        }
        reasons.extend(unavailable);

        PolicyOutcome {
            decision: Decision::Allow,
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{HoneypotReport, MarketData};

    fn clean_honeypot() -> SignalResult {
        SignalResult::from_honeypot_report(HoneypotReport::clean(), DEFAULT_MAX_SELL_TAX)
    }

    fn flagged_honeypot() -> SignalResult {
        let report = HoneypotReport {
            is_honeypot: true,
            hidden_owner: true,
            ..Default::default()
        };
        SignalResult::from_honeypot_report(report, DEFAULT_MAX_SELL_TAX)
    }

    fn liquidity(usd: f64) -> SignalResult {
        SignalResult::LiquidityInfo(MarketData {
            price_usd: Some(0.01),
            liquidity_usd: usd,
        })
    }

    fn unavailable(kind: SignalKind) -> SignalResult {
        SignalResult::unknown(kind, "timeout")
    }

    #[test]
    fn test_honeypot_blocks_with_flag_reasons() {
        let outcome = RiskPolicy::default().evaluate(&flagged_honeypot(), &liquidity(1_000_000.0));
        assert_eq!(outcome.decision, Decision::Block);
        assert_eq!(outcome.reasons, vec!["honeypot", "hiddenOwner"]);
    }

    #[test]
    fn test_honeypot_blocks_even_when_liquidity_unavailable() {
        let outcome =
            RiskPolicy::default().evaluate(&flagged_honeypot(), &unavailable(SignalKind::Liquidity));
        assert_eq!(outcome.decision, Decision::Block);
        assert_eq!(
            outcome.reasons,
            vec!["honeypot", "hiddenOwner", "liquidity_unavailable"]
        );
    }

    #[test]
    fn test_low_liquidity_allows_with_annotation() {
        let outcome = RiskPolicy::default().evaluate(&clean_honeypot(), &liquidity(5_000.0));
        assert_eq!(outcome.decision, Decision::Allow);
        assert_eq!(outcome.reasons, vec![REASON_LOW_LIQUIDITY]);
    }

    #[test]
    fn test_liquidity_at_threshold_is_not_low() {
        let outcome = RiskPolicy::default().evaluate(&clean_honeypot(), &liquidity(30_000.0));
        assert_eq!(outcome.decision, Decision::Allow);
        assert_eq!(outcome.reasons, vec![REASON_NO_RISK_SIGNAL]);
    }

    #[test]
    fn test_no_market_is_weak_signal() {
        let outcome = RiskPolicy::default()
            .evaluate(&clean_honeypot(), &SignalResult::LiquidityInfo(MarketData::empty()));
        assert_eq!(outcome.decision, Decision::Allow);
        assert_eq!(outcome.reasons, vec![REASON_NO_MARKET_DATA, REASON_LOW_LIQUIDITY]);
    }

    #[test]
    fn test_single_unavailable_does_not_change_decision() {
        let outcome = RiskPolicy::default()
            .evaluate(&unavailable(SignalKind::Honeypot), &liquidity(100_000.0));
        assert_eq!(outcome.decision, Decision::Allow);
        assert_eq!(
            outcome.reasons,
            vec![REASON_NO_RISK_SIGNAL, "honeypot_unavailable"]
        );
    }

    #[test]
    fn test_both_unavailable_is_unknown() {
        let outcome = RiskPolicy::default().evaluate(
            &unavailable(SignalKind::Honeypot),
            &unavailable(SignalKind::Liquidity),
        );
        assert_eq!(outcome.decision, Decision::Unknown);
        assert_eq!(
            outcome.reasons,
            vec!["honeypot_unavailable", "liquidity_unavailable"]
        );
    }

    #[test]
    fn test_custom_threshold() {
        let policy = RiskPolicy::new(1_000.0, DEFAULT_MAX_SELL_TAX);
        let outcome = policy.evaluate(&clean_honeypot(), &liquidity(5_000.0));
        assert_eq!(outcome.reasons, vec![REASON_NO_RISK_SIGNAL]);
    }
}
