//! Scan Service
//!
//! Backs `GET /api/scan` and `pubs-burn scan`. Normalizes the raw address,
//! asks the decision cache for a verdict and, for tokens that were not
//! excluded outright, reads ERC-20 metadata for display.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::decision_cache::DecisionCache;
use crate::domain::{Decision, HoneypotReport, MarketData, TokenAddress, TokenAddressError};
use crate::ports::{MetadataSource, TokenMeta};

/// Errors surfaced to the caller before any lookup happens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Invalid token: {0}")]
    InvalidInput(#[from] TokenAddressError),
}

/// Full scan of a token that was not excluded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub token: TokenAddress,
    /// Always false here; verified contracts are excluded before this point
    pub verified: bool,
    pub honeypot: Option<HoneypotReport>,
    pub meta: TokenMeta,
    pub status: &'static str,
    pub decision: Decision,
    pub reasons: Vec<String>,
    pub liquidity: Option<MarketData>,
    pub evaluated_at: DateTime<Utc>,
}

/// Body of a scan response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScanReport {
    Excluded { excluded: bool, reason: String },
    Complete(Box<ScanResult>),
}

impl ScanReport {
    pub fn is_excluded(&self) -> bool {
        matches!(self, ScanReport::Excluded { .. })
    }

    /// Decision behind the report; excluded tokens are always blocked
    pub fn decision(&self) -> Decision {
        match self {
            ScanReport::Excluded { .. } => Decision::Block,
            ScanReport::Complete(result) => result.decision,
        }
    }
}

pub const STATUS_SCAN_COMPLETE: &str = "scan_complete";

pub struct ScanService {
    cache: Arc<DecisionCache>,
    metadata: Arc<dyn MetadataSource>,
    metadata_timeout: Duration,
}

impl ScanService {
    pub fn new(cache: Arc<DecisionCache>, metadata: Arc<dyn MetadataSource>) -> Self {
        let metadata_timeout = cache.aggregator().fetch_timeout();
        Self {
            cache,
            metadata,
            metadata_timeout,
        }
    }

    pub fn with_metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &Arc<DecisionCache> {
        &self.cache
    }

    /// Scan a raw, user-supplied address
    pub async fn scan(&self, raw: &str) -> Result<ScanReport, ScanError> {
        let token = TokenAddress::parse(raw)?;
        let verdict = self.cache.get_or_compute(&token).await;

        if verdict.is_excluded() {
            let reason = verdict.primary_reason().unwrap_or_default().to_string();
            tracing::info!("Scan {}: excluded ({})", token, reason);
            return Ok(ScanReport::Excluded {
                excluded: true,
                reason,
            });
        }

        let meta = self.read_metadata(&token).await;
        tracing::info!(
            "Scan {}: {:?} [{}]",
            token,
            verdict.decision,
            verdict.reasons.join(", ")
        );

        Ok(ScanReport::Complete(Box::new(ScanResult {
            token,
            verified: false,
            honeypot: verdict.honeypot,
            meta,
            status: STATUS_SCAN_COMPLETE,
            decision: verdict.decision,
            reasons: verdict.reasons,
            liquidity: verdict.liquidity,
            evaluated_at: verdict.evaluated_at,
        })))
    }

    async fn read_metadata(&self, token: &TokenAddress) -> TokenMeta {
        match tokio::time::timeout(self.metadata_timeout, self.metadata.metadata(token)).await {
            Ok(Ok(meta)) => meta,
            Ok(Err(e)) => {
                tracing::warn!("Metadata lookup for {} failed: {}", token, e);
                TokenMeta::fallback()
            }
            Err(_) => {
                tracing::warn!("Metadata lookup for {} timed out", token);
                TokenMeta::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::classifier::{Blocklist, RiskAggregator, SignalSources};
    use crate::ports::mocks::{MockHoneypot, MockLiquidity, MockMetadata, MockVerification};
    use crate::ports::FetchError;

    const STABLE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const TOKEN: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

    fn pepe() -> TokenMeta {
        TokenMeta {
            symbol: "PEPE".to_string(),
            name: "Pepe".to_string(),
            decimals: 9,
        }
    }

    fn service(verified: bool, metadata: MockMetadata) -> ScanService {
        let sources = SignalSources {
            verification: Arc::new(MockVerification::new(verified)),
            honeypot: Arc::new(MockHoneypot::new(HoneypotReport::clean())),
            liquidity: Arc::new(MockLiquidity::new(MarketData {
                price_usd: Some(0.01),
                liquidity_usd: 80_000.0,
            })),
        };
        let blocklist = Blocklist::new([TokenAddress::parse(STABLE).unwrap()]);
        let aggregator = Arc::new(RiskAggregator::new(blocklist, sources));
        ScanService::new(Arc::new(DecisionCache::new(aggregator)), Arc::new(metadata))
    }

    #[tokio::test]
    async fn test_invalid_input_rejected() {
        let metadata = MockMetadata::new(pepe());
        let svc = service(false, metadata.clone());

        assert!(matches!(svc.scan("0x1234").await, Err(ScanError::InvalidInput(_))));
        assert!(matches!(svc.scan("").await, Err(ScanError::InvalidInput(_))));
        assert_eq!(metadata.call_count(), 0);
        assert!(svc.cache().is_empty());
    }

    #[tokio::test]
    async fn test_blocklisted_is_excluded_without_metadata() {
        let metadata = MockMetadata::new(pepe());
        let svc = service(false, metadata.clone());

        let report = svc.scan(&STABLE.to_uppercase().replace("0X", "0x")).await.unwrap();
        assert_eq!(
            report,
            ScanReport::Excluded {
                excluded: true,
                reason: "stablecoin_or_official".to_string()
            }
        );
        assert_eq!(metadata.call_count(), 0);
    }

    #[tokio::test]
    async fn test_verified_is_excluded() {
        let svc = service(true, MockMetadata::new(pepe()));
        let report = svc.scan(TOKEN).await.unwrap();

        assert!(report.is_excluded());
        assert_eq!(report.decision(), Decision::Block);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["reason"], "verified_contract");
    }

    #[tokio::test]
    async fn test_complete_scan_shape() {
        let svc = service(false, MockMetadata::new(pepe()));
        let report = svc.scan(TOKEN).await.unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["token"], TOKEN);
        assert_eq!(json["verified"], false);
        assert_eq!(json["status"], "scan_complete");
        assert_eq!(json["decision"], "allow");
        assert_eq!(json["reasons"][0], "no_risk_signal");
        assert_eq!(json["meta"]["symbol"], "PEPE");
        assert_eq!(json["meta"]["decimals"], 9);
        assert_eq!(json["honeypot"]["isHoneypot"], false);
        assert_eq!(json["liquidity"]["liquidityUsd"], 80_000.0);
        assert!(json.get("evaluatedAt").is_some());
        assert!(json.get("excluded").is_none());
    }

    #[tokio::test]
    async fn test_metadata_failure_uses_fallback() {
        let svc = service(
            false,
            MockMetadata::failing(FetchError::Http("connection refused".to_string())),
        );
        let report = svc.scan(TOKEN).await.unwrap();

        match report {
            ScanReport::Complete(result) => assert_eq!(result.meta, TokenMeta::fallback()),
            other => panic!("expected complete scan, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_metadata_timeout_uses_fallback() {
        let svc = service(
            false,
            MockMetadata::new(pepe()).with_delay(Duration::from_secs(30)),
        )
        .with_metadata_timeout(Duration::from_millis(100));
        let report = svc.scan(TOKEN).await.unwrap();

        match report {
            ScanReport::Complete(result) => {
                assert_eq!(result.meta.decimals, 18);
                assert_eq!(result.decision, Decision::Allow);
            }
            other => panic!("expected complete scan, got {:?}", other),
        }
    }
}
