//! Risk Signals
//!
//! Outputs of the individual signal fetchers. A fetcher that could not
//! produce an answer yields `SignalResult::Unknown`, which is never the same
//! thing as a negative (safe) answer.

use serde::{Deserialize, Serialize};

/// Reason attached to blocklisted tokens
pub const REASON_STABLECOIN_OR_OFFICIAL: &str = "stablecoin_or_official";

/// Reason attached to contracts with published source
pub const REASON_VERIFIED_CONTRACT: &str = "verified_contract";

/// Which fetcher produced a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Blocklist,
    Verification,
    Honeypot,
    Liquidity,
}

impl SignalKind {
    pub fn name(&self) -> &'static str {
        match self {
            SignalKind::Blocklist => "blocklist",
            SignalKind::Verification => "verification",
            SignalKind::Honeypot => "honeypot",
            SignalKind::Liquidity => "liquidity",
        }
    }

    /// Reason recorded in a verdict when this signal could not be fetched
    pub fn unavailable_reason(&self) -> String {
        format!("{}_unavailable", self.name())
    }
}

/// A single risky property reported by the honeypot detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoneypotFlag {
    /// Simulated sell reverts
    Honeypot,
    /// Holders cannot sell their full balance
    CannotSell,
    /// Owner can still mint
    MintEnabled,
    /// Ownership is obscured behind a proxy or hidden slot
    HiddenOwner,
    /// Sell tax above the configured ceiling
    HighSellTax,
}

impl HoneypotFlag {
    /// Stable reason string used in verdicts
    pub fn reason(&self) -> &'static str {
        match self {
            HoneypotFlag::Honeypot => "honeypot",
            HoneypotFlag::CannotSell => "cannotSell",
            HoneypotFlag::MintEnabled => "mintEnabled",
            HoneypotFlag::HiddenOwner => "hiddenOwner",
            HoneypotFlag::HighSellTax => "highSellTax",
        }
    }
}

/// Raw answer from a honeypot/tax detector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneypotReport {
    pub is_honeypot: bool,
    pub cannot_sell: bool,
    pub mint_enabled: bool,
    pub hidden_owner: bool,
    /// Buy tax as a fraction (0.05 = 5%)
    pub buy_tax: Option<f64>,
    /// Sell tax as a fraction (0.05 = 5%)
    pub sell_tax: Option<f64>,
}

impl HoneypotReport {
    /// Report for a token with no detected issues
    pub fn clean() -> Self {
        Self::default()
    }

    /// Report for a confirmed honeypot
    pub fn honeypot() -> Self {
        Self {
            is_honeypot: true,
            ..Default::default()
        }
    }

    /// Flags raised by this report, in fixed order.
    ///
    /// `max_sell_tax` is a fraction; a sell tax strictly above it raises
    /// `HighSellTax`.
    pub fn triggered_flags(&self, max_sell_tax: f64) -> Vec<HoneypotFlag> {
        let mut flags = Vec::new();
        if self.is_honeypot {
            flags.push(HoneypotFlag::Honeypot);
        }
        if self.cannot_sell {
            flags.push(HoneypotFlag::CannotSell);
        }
        if self.mint_enabled {
            flags.push(HoneypotFlag::MintEnabled);
        }
        if self.hidden_owner {
            flags.push(HoneypotFlag::HiddenOwner);
        }
        if self.sell_tax.map_or(false, |tax| tax > max_sell_tax) {
            flags.push(HoneypotFlag::HighSellTax);
        }
        flags
    }
}

/// Price and pool depth from a DEX aggregator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub price_usd: Option<f64>,
    pub liquidity_usd: f64,
}

impl MarketData {
    /// No pools found for the token
    pub fn empty() -> Self {
        Self {
            price_usd: None,
            liquidity_usd: 0.0,
        }
    }

    /// Whether the aggregator returned a usable market
    pub fn has_market(&self) -> bool {
        self.price_usd.is_some() && self.liquidity_usd > 0.0
    }
}

/// Output of one signal fetcher
#[derive(Debug, Clone, PartialEq)]
pub enum SignalResult {
    /// Token is on the configured blocklist
    Blocked { reason: String },
    /// Contract source is published on the block explorer
    Verified { reason: String },
    /// Honeypot detector answered; `flags` is empty for a clean token
    HoneypotFlag {
        report: HoneypotReport,
        flags: Vec<HoneypotFlag>,
    },
    /// DEX market data answered
    LiquidityInfo(MarketData),
    /// Fetcher failed, timed out, or had nothing to say
    Unknown { signal: SignalKind, reason: String },
}

impl SignalResult {
    pub fn blocked() -> Self {
        SignalResult::Blocked {
            reason: REASON_STABLECOIN_OR_OFFICIAL.to_string(),
        }
    }

    pub fn verified() -> Self {
        SignalResult::Verified {
            reason: REASON_VERIFIED_CONTRACT.to_string(),
        }
    }

    pub fn unknown(signal: SignalKind, reason: impl Into<String>) -> Self {
        SignalResult::Unknown {
            signal,
            reason: reason.into(),
        }
    }

    /// Build a honeypot signal, deriving flags with the given tax ceiling
    pub fn from_honeypot_report(report: HoneypotReport, max_sell_tax: f64) -> Self {
        let flags = report.triggered_flags(max_sell_tax);
        SignalResult::HoneypotFlag { report, flags }
    }

    /// Whether the fetcher produced an answer
    pub fn is_available(&self) -> bool {
        !matches!(self, SignalResult::Unknown { .. })
    }

    /// Whether this signal on its own argues against the token
    pub fn is_risky(&self) -> bool {
        match self {
            SignalResult::HoneypotFlag { flags, .. } => !flags.is_empty(),
            _ => false,
        }
    }

    /// Human-readable reason carried by the signal
    pub fn reason(&self) -> String {
        match self {
            SignalResult::Blocked { reason }
            | SignalResult::Verified { reason }
            | SignalResult::Unknown { reason, .. } => reason.clone(),
            SignalResult::HoneypotFlag { flags, .. } => {
                if flags.is_empty() {
                    "no_honeypot_flags".to_string()
                } else {
                    flags
                        .iter()
                        .map(|f| f.reason())
                        .collect::<Vec<_>>()
                        .join(",")
                }
            }
            SignalResult::LiquidityInfo(data) => {
                format!("liquidity_usd={:.2}", data.liquidity_usd)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_report_has_no_flags() {
        assert!(HoneypotReport::clean().triggered_flags(0.10).is_empty());
    }

    #[test]
    fn test_flags_in_fixed_order() {
        let report = HoneypotReport {
            is_honeypot: true,
            cannot_sell: true,
            mint_enabled: true,
            hidden_owner: true,
            buy_tax: None,
            sell_tax: Some(0.5),
        };
        let reasons: Vec<&str> = report
            .triggered_flags(0.10)
            .iter()
            .map(|f| f.reason())
            .collect();
        assert_eq!(
            reasons,
            vec!["honeypot", "cannotSell", "mintEnabled", "hiddenOwner", "highSellTax"]
        );
    }

    #[test]
    fn test_sell_tax_threshold_is_strict() {
        let at_limit = HoneypotReport {
            sell_tax: Some(0.10),
            ..Default::default()
        };
        assert!(at_limit.triggered_flags(0.10).is_empty());

        let above = HoneypotReport {
            sell_tax: Some(0.11),
            ..Default::default()
        };
        assert_eq!(above.triggered_flags(0.10), vec![HoneypotFlag::HighSellTax]);
    }

    #[test]
    fn test_unknown_is_not_available() {
        let signal = SignalResult::unknown(SignalKind::Honeypot, "timeout");
        assert!(!signal.is_available());
        assert!(!signal.is_risky());
        assert_eq!(signal.reason(), "timeout");
    }

    #[test]
    fn test_honeypot_signal_risky_only_with_flags() {
        let clean = SignalResult::from_honeypot_report(HoneypotReport::clean(), 0.10);
        assert!(clean.is_available());
        assert!(!clean.is_risky());

        let flagged = SignalResult::from_honeypot_report(HoneypotReport::honeypot(), 0.10);
        assert!(flagged.is_risky());
        assert_eq!(flagged.reason(), "honeypot");
    }

    #[test]
    fn test_market_data_presence() {
        assert!(!MarketData::empty().has_market());
        assert!(!MarketData {
            price_usd: Some(1.0),
            liquidity_usd: 0.0
        }
        .has_market());
        assert!(MarketData {
            price_usd: Some(1.0),
            liquidity_usd: 10.0
        }
        .has_market());
    }

    #[test]
    fn test_unavailable_reason() {
        assert_eq!(SignalKind::Honeypot.unavailable_reason(), "honeypot_unavailable");
        assert_eq!(SignalKind::Liquidity.unavailable_reason(), "liquidity_unavailable");
    }
}
