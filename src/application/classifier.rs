//! Risk Aggregator
//!
//! Merges the blocklist, verification, honeypot and liquidity signals into a
//! single `RiskVerdict`. Precedence, stopping at the first conclusive step:
//!
//! 1. blocklist hit → `Block` (`stablecoin_or_official`)
//! 2. verified source → `Block` (`verified_contract`)
//! 3. honeypot and liquidity fetched concurrently, then `RiskPolicy`
//!
//! Every fetch is bounded by `fetch_timeout`. Errors and timeouts become
//! `SignalResult::Unknown`; `classify` itself never fails.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::{
    HoneypotReport, MarketData, RiskPolicy, RiskVerdict, SignalKind, SignalResult, TokenAddress,
};
use crate::ports::{FetchError, HoneypotSource, LiquiditySource, VerificationSource};

/// Default per-fetch timeout
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(6);

/// Reason for an `Unknown` verification when the explorer has no source
pub const REASON_SOURCE_NOT_PUBLISHED: &str = "source_not_published";

/// Stablecoins and official tokens that must never be burned
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    entries: HashSet<TokenAddress>,
}

impl Blocklist {
    pub fn new(entries: impl IntoIterator<Item = TokenAddress>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn contains(&self, token: &TokenAddress) -> bool {
        self.entries.contains(token)
    }

    /// `Blocked` on a hit, `None` otherwise
    pub fn check(&self, token: &TokenAddress) -> Option<SignalResult> {
        self.contains(token).then(SignalResult::blocked)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The network-backed signal fetchers
#[derive(Clone)]
pub struct SignalSources {
    pub verification: Arc<dyn VerificationSource>,
    pub honeypot: Arc<dyn HoneypotSource>,
    pub liquidity: Arc<dyn LiquiditySource>,
}

pub struct RiskAggregator {
    blocklist: Blocklist,
    sources: SignalSources,
    policy: RiskPolicy,
    fetch_timeout: Duration,
}

impl RiskAggregator {
    pub fn new(blocklist: Blocklist, sources: SignalSources) -> Self {
        Self {
            blocklist,
            sources,
            policy: RiskPolicy::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: RiskPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn blocklist(&self) -> &Blocklist {
        &self.blocklist
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Classify a normalized token address
    pub async fn classify(&self, token: &TokenAddress) -> RiskVerdict {
        if let Some(SignalResult::Blocked { reason }) = self.blocklist.check(token) {
            info!(%token, %reason, "Token excluded by blocklist");
            return RiskVerdict::block(token.clone(), reason);
        }

        if let SignalResult::Verified { reason } = self.verification_signal(token).await {
            info!(%token, %reason, "Token excluded as verified contract");
            return RiskVerdict::block(token.clone(), reason);
        }

        let (honeypot, liquidity) =
            tokio::join!(self.honeypot_signal(token), self.liquidity_signal(token));

        let outcome = self.policy.evaluate(&honeypot, &liquidity);
        let verdict = RiskVerdict::new(token.clone(), outcome.decision, outcome.reasons)
            .with_honeypot(honeypot_report(&honeypot))
            .with_liquidity(market_data(&liquidity));

        info!(
            %token,
            decision = ?verdict.decision,
            reasons = ?verdict.reasons,
            "Token classified"
        );
        verdict
    }

    async fn verification_signal(&self, token: &TokenAddress) -> SignalResult {
        match self
            .bounded(SignalKind::Verification, token, self.sources.verification.is_verified(token))
            .await
        {
            Ok(true) => SignalResult::verified(),
            Ok(false) => SignalResult::unknown(SignalKind::Verification, REASON_SOURCE_NOT_PUBLISHED),
            Err(e) => SignalResult::unknown(SignalKind::Verification, e.label()),
        }
    }

    async fn honeypot_signal(&self, token: &TokenAddress) -> SignalResult {
        match self
            .bounded(SignalKind::Honeypot, token, self.sources.honeypot.check(token))
            .await
        {
            Ok(report) => SignalResult::from_honeypot_report(report, self.policy.max_sell_tax),
            Err(e) => SignalResult::unknown(SignalKind::Honeypot, e.label()),
        }
    }

    async fn liquidity_signal(&self, token: &TokenAddress) -> SignalResult {
        match self
            .bounded(SignalKind::Liquidity, token, self.sources.liquidity.market_data(token))
            .await
        {
            Ok(data) => SignalResult::LiquidityInfo(data),
            Err(e) => SignalResult::unknown(SignalKind::Liquidity, e.label()),
        }
    }

    /// Apply the fetch timeout and log failures
    async fn bounded<T, F>(&self, kind: SignalKind, token: &TokenAddress, fetch: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        let result = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.fetch_timeout)),
        };

        match &result {
            Ok(_) => debug!(%token, signal = kind.name(), "Signal fetched"),
            Err(e) => warn!(%token, signal = kind.name(), error = %e, "Signal unavailable"),
        }
        result
    }
}

fn honeypot_report(signal: &SignalResult) -> Option<HoneypotReport> {
    match signal {
        SignalResult::HoneypotFlag { report, .. } => Some(report.clone()),
        _ => None,
    }
}

fn market_data(signal: &SignalResult) -> Option<MarketData> {
    match signal {
        SignalResult::LiquidityInfo(data) => Some(*data),
        _ => None,
    }
}
