//! Burn Flow
//!
//! Drives one approve+burn round trip through the wallet port. The decision
//! cache gates the flow before any transaction is built, and every step is
//! checked against the lifecycle state machine and published on a `watch`
//! channel so a UI can render progress without tracking flags of its own.

use std::sync::Arc;

use alloy::primitives::U256;
use thiserror::Error;
use tokio::sync::watch;

use super::decision_cache::DecisionCache;
use crate::domain::calldata;
use crate::domain::{BurnEvent, BurnLifecycle, BurnState, Decision, LifecycleError, TokenAddress};
use crate::ports::{BurnerPort, FetchError, TxRequest, WalletError, WalletPort};

/// Summary string recorded on-chain with each burn
pub const DEFAULT_BURN_SUMMARY: &str = "PUBS BURN";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BurnError {
    #[error("Token rejected: {}", .reasons.join(", "))]
    Rejected { reasons: Vec<String> },

    #[error("Risk inconclusive ({}); explicit confirmation required", .reasons.join(", "))]
    Inconclusive { reasons: Vec<String> },

    #[error("No wallet account connected")]
    NoAccount,

    #[error("Burn amount must be greater than zero")]
    ZeroAmount,

    #[error("Fee quote failed: {0}")]
    Quote(#[from] FetchError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("{stage} transaction {tx_hash} reverted")]
    Reverted { stage: &'static str, tx_hash: String },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// What to burn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnRequest {
    pub token: TokenAddress,
    /// Amount in the token's base units
    pub amount: U256,
    pub summary: String,
    /// Proceed even when the classifier could not reach a decision
    pub accept_unknown: bool,
}

impl BurnRequest {
    pub fn new(token: TokenAddress, amount: U256) -> Self {
        Self {
            token,
            amount,
            summary: DEFAULT_BURN_SUMMARY.to_string(),
            accept_unknown: false,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// The user has seen the "risk unknown" warning and wants to continue
    pub fn accepting_unknown(mut self) -> Self {
        self.accept_unknown = true;
        self
    }
}

/// Result of a completed burn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnReceipt {
    pub token: TokenAddress,
    pub from: TokenAddress,
    pub amount: U256,
    pub fee: U256,
    pub approval_tx: String,
    pub burn_tx: String,
    pub decision: Decision,
}

/// Lifecycle plus the channel it is published on
struct Progress<'a> {
    lifecycle: BurnLifecycle,
    sender: &'a watch::Sender<BurnState>,
}

impl<'a> Progress<'a> {
    fn start(sender: &'a watch::Sender<BurnState>) -> Self {
        let lifecycle = BurnLifecycle::new();
        sender.send_replace(lifecycle.state().clone());
        Self { lifecycle, sender }
    }

    fn advance(&mut self, event: BurnEvent) -> Result<(), BurnError> {
        let state = self.lifecycle.apply(event)?.clone();
        tracing::info!("Burn lifecycle -> {}", state.name());
        // Receivers may be gone; the flow carries on regardless
        self.sender.send_replace(state);
        Ok(())
    }

    fn fail(&mut self, error: &BurnError) {
        if self.lifecycle.state().is_terminal() {
            return;
        }
        let reason = error.to_string();
        if let Ok(state) = self.lifecycle.apply(BurnEvent::Fail { reason }) {
            self.sender.send_replace(state.clone());
        }
    }
}

pub struct BurnFlow {
    cache: Arc<DecisionCache>,
    wallet: Arc<dyn WalletPort>,
    burner: Arc<dyn BurnerPort>,
    burner_address: TokenAddress,
}

impl BurnFlow {
    pub fn new(
        cache: Arc<DecisionCache>,
        wallet: Arc<dyn WalletPort>,
        burner: Arc<dyn BurnerPort>,
        burner_address: TokenAddress,
    ) -> Self {
        Self {
            cache,
            wallet,
            burner,
            burner_address,
        }
    }

    pub fn burner_address(&self) -> &TokenAddress {
        &self.burner_address
    }

    /// Run the full approve+burn sequence.
    ///
    /// `progress` always ends in `Done` or `Failed`.
    pub async fn execute(
        &self,
        request: BurnRequest,
        progress: &watch::Sender<BurnState>,
    ) -> Result<BurnReceipt, BurnError> {
        let mut progress = Progress::start(progress);
        match self.run(&request, &mut progress).await {
            Ok(receipt) => {
                tracing::info!(
                    "Burned {} of {} from {} (tx {})",
                    receipt.amount,
                    receipt.token,
                    receipt.from,
                    receipt.burn_tx
                );
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!("Burn of {} failed: {}", request.token, e);
                progress.fail(&e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request: &BurnRequest,
        progress: &mut Progress<'_>,
    ) -> Result<BurnReceipt, BurnError> {
        let token = &request.token;

        let verdict = self.cache.get_or_compute(token).await;
        match verdict.decision {
            Decision::Block => {
                return Err(BurnError::Rejected {
                    reasons: verdict.reasons,
                })
            }
            Decision::Unknown if !request.accept_unknown => {
                return Err(BurnError::Inconclusive {
                    reasons: verdict.reasons,
                })
            }
            Decision::Unknown => {
                tracing::warn!("Burning {} with unknown risk, confirmed by user", token);
            }
            Decision::Allow => {}
        }

        let from = self
            .wallet
            .request_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(BurnError::NoAccount)?;

        if request.amount.is_zero() {
            return Err(BurnError::ZeroAmount);
        }

        let quote = self.burner.quote_erc20_fee(token, request.amount).await?;
        tracing::debug!("Burner fee for {}: {} wei", token, quote.fee);

        progress.advance(BurnEvent::StartApproval)?;
        let approve = TxRequest {
            to: token.clone(),
            data: calldata::encode_approve(&self.burner_address, request.amount),
            value: U256::ZERO,
        };
        let approval_tx = self.wallet.send_transaction(&from, approve).await?;
        progress.advance(BurnEvent::ApprovalSubmitted {
            tx_hash: approval_tx.clone(),
        })?;
        if !self.wallet.wait_for_receipt(&approval_tx).await? {
            return Err(BurnError::Reverted {
                stage: "approval",
                tx_hash: approval_tx,
            });
        }
        progress.advance(BurnEvent::ApprovalConfirmed)?;

        progress.advance(BurnEvent::StartBurn)?;
        let burn = TxRequest {
            to: self.burner_address.clone(),
            data: calldata::encode_burn(token, request.amount, &request.summary),
            value: quote.fee,
        };
        let burn_tx = self.wallet.send_transaction(&from, burn).await?;
        progress.advance(BurnEvent::BurnSubmitted {
            tx_hash: burn_tx.clone(),
        })?;
        if !self.wallet.wait_for_receipt(&burn_tx).await? {
            return Err(BurnError::Reverted {
                stage: "burn",
                tx_hash: burn_tx,
            });
        }
        progress.advance(BurnEvent::BurnConfirmed)?;

        Ok(BurnReceipt {
            token: token.clone(),
            from,
            amount: request.amount,
            fee: quote.fee,
            approval_tx,
            burn_tx,
            decision: verdict.decision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::classifier::{Blocklist, RiskAggregator, SignalSources};
    use crate::domain::{HoneypotReport, MarketData};
    use crate::ports::mocks::{MockBurner, MockHoneypot, MockLiquidity, MockVerification, MockWallet};

    const TOKEN: &str = "0xcccccccccccccccccccccccccccccccccccccccc";
    const STABLE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const USER: &str = "0x1234567890abcdef1234567890abcdef12345678";
    const BURNER: &str = "0x9999999999999999999999999999999999999999";

    fn addr(raw: &str) -> TokenAddress {
        TokenAddress::parse(raw).unwrap()
    }

    fn cache(honeypot: MockHoneypot, liquidity: MockLiquidity) -> Arc<DecisionCache> {
        let sources = SignalSources {
            verification: Arc::new(MockVerification::new(false)),
            honeypot: Arc::new(honeypot),
            liquidity: Arc::new(liquidity),
        };
        let aggregator = RiskAggregator::new(Blocklist::new([addr(STABLE)]), sources);
        Arc::new(DecisionCache::new(Arc::new(aggregator)))
    }

    fn clean_cache() -> Arc<DecisionCache> {
        cache(
            MockHoneypot::new(HoneypotReport::clean()),
            MockLiquidity::new(MarketData {
                price_usd: Some(1.0),
                liquidity_usd: 50_000.0,
            }),
        )
    }

    fn unknown_cache() -> Arc<DecisionCache> {
        cache(
            MockHoneypot::failing(FetchError::Http("down".to_string())),
            MockLiquidity::failing(FetchError::Http("down".to_string())),
        )
    }

    fn flow(cache: Arc<DecisionCache>, wallet: &MockWallet, burner: &MockBurner) -> BurnFlow {
        BurnFlow::new(
            cache,
            Arc::new(wallet.clone()),
            Arc::new(burner.clone()),
            addr(BURNER),
        )
    }

    fn amount() -> U256 {
        U256::from(1_000_000u64)
    }

    #[tokio::test]
    async fn test_successful_burn_sends_approve_then_burn() {
        let wallet = MockWallet::new(USER);
        let burner = MockBurner::new(U256::from(5_000u64));
        let (tx, rx) = watch::channel(BurnState::Idle);

        let receipt = flow(clean_cache(), &wallet, &burner)
            .execute(BurnRequest::new(addr(TOKEN), amount()), &tx)
            .await
            .unwrap();

        let sent = wallet.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, addr(TOKEN));
        assert_eq!(sent[0].data, calldata::encode_approve(&addr(BURNER), amount()));
        assert_eq!(sent[0].value, U256::ZERO);
        assert_eq!(sent[1].to, addr(BURNER));
        assert_eq!(
            sent[1].data,
            calldata::encode_burn(&addr(TOKEN), amount(), DEFAULT_BURN_SUMMARY)
        );
        assert_eq!(sent[1].value, U256::from(5_000u64));

        assert_eq!(burner.get_calls(), vec![(addr(TOKEN), amount())]);
        assert_eq!(receipt.from, addr(USER));
        assert_eq!(receipt.decision, Decision::Allow);
        assert_eq!(
            *rx.borrow(),
            BurnState::Done {
                tx_hash: receipt.burn_tx.clone()
            }
        );
    }

    #[tokio::test]
    async fn test_blocked_token_never_reaches_wallet() {
        let wallet = MockWallet::new(USER);
        let burner = MockBurner::new(U256::ZERO);
        let (tx, rx) = watch::channel(BurnState::Idle);

        let err = flow(clean_cache(), &wallet, &burner)
            .execute(BurnRequest::new(addr(STABLE), amount()), &tx)
            .await
            .unwrap_err();

        assert!(matches!(err, BurnError::Rejected { ref reasons } if reasons[0] == "stablecoin_or_official"));
        assert!(wallet.sent().is_empty());
        assert!(burner.get_calls().is_empty());
        assert!(matches!(*rx.borrow(), BurnState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_honeypot_rejected() {
        let wallet = MockWallet::new(USER);
        let burner = MockBurner::new(U256::ZERO);
        let cache = cache(
            MockHoneypot::new(HoneypotReport::honeypot()),
            MockLiquidity::new(MarketData::empty()),
        );
        let (tx, _rx) = watch::channel(BurnState::Idle);

        let err = flow(cache, &wallet, &burner)
            .execute(BurnRequest::new(addr(TOKEN), amount()), &tx)
            .await
            .unwrap_err();

        assert!(matches!(err, BurnError::Rejected { ref reasons } if reasons.contains(&"honeypot".to_string())));
        assert!(wallet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_requires_explicit_acceptance() {
        let wallet = MockWallet::new(USER);
        let burner = MockBurner::new(U256::from(1u64));
        let flow = flow(unknown_cache(), &wallet, &burner);
        let (tx, _rx) = watch::channel(BurnState::Idle);

        let err = flow
            .execute(BurnRequest::new(addr(TOKEN), amount()), &tx)
            .await
            .unwrap_err();
        assert!(matches!(err, BurnError::Inconclusive { .. }));
        assert!(wallet.sent().is_empty());

        let receipt = flow
            .execute(BurnRequest::new(addr(TOKEN), amount()).accepting_unknown(), &tx)
            .await
            .unwrap();
        assert_eq!(receipt.decision, Decision::Unknown);
        assert_eq!(wallet.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_reverted_approval_stops_before_burn() {
        let wallet = MockWallet::new(USER).with_receipts(vec![false]);
        let burner = MockBurner::new(U256::from(1u64));
        let (tx, rx) = watch::channel(BurnState::Idle);

        let err = flow(clean_cache(), &wallet, &burner)
            .execute(BurnRequest::new(addr(TOKEN), amount()), &tx)
            .await
            .unwrap_err();

        assert!(matches!(err, BurnError::Reverted { stage: "approval", .. }));
        assert_eq!(wallet.sent().len(), 1);
        let state = rx.borrow().clone();
        match state {
            BurnState::Failed { reason } => assert!(reason.contains("reverted")),
            other => panic!("expected failed state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reverted_burn_fails() {
        let wallet = MockWallet::new(USER).with_receipts(vec![true, false]);
        let burner = MockBurner::new(U256::from(1u64));
        let (tx, rx) = watch::channel(BurnState::Idle);

        let err = flow(clean_cache(), &wallet, &burner)
            .execute(BurnRequest::new(addr(TOKEN), amount()), &tx)
            .await
            .unwrap_err();

        assert!(matches!(err, BurnError::Reverted { stage: "burn", .. }));
        assert_eq!(wallet.sent().len(), 2);
        assert!(matches!(*rx.borrow(), BurnState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_no_account_and_zero_amount() {
        let burner = MockBurner::new(U256::from(1u64));
        let (tx, _rx) = watch::channel(BurnState::Idle);

        let err = flow(clean_cache(), &MockWallet::disconnected(), &burner)
            .execute(BurnRequest::new(addr(TOKEN), amount()), &tx)
            .await
            .unwrap_err();
        assert_eq!(err, BurnError::NoAccount);

        let err = flow(clean_cache(), &MockWallet::new(USER), &burner)
            .execute(BurnRequest::new(addr(TOKEN), U256::ZERO), &tx)
            .await
            .unwrap_err();
        assert_eq!(err, BurnError::ZeroAmount);
        assert!(burner.get_calls().is_empty());
    }

    #[tokio::test]
    async fn test_quote_failure_and_wallet_rejection() {
        let (tx, _rx) = watch::channel(BurnState::Idle);

        let err = flow(
            clean_cache(),
            &MockWallet::new(USER),
            &MockBurner::failing(FetchError::Parse("bad abi".to_string())),
        )
        .execute(BurnRequest::new(addr(TOKEN), amount()), &tx)
        .await
        .unwrap_err();
        assert!(matches!(err, BurnError::Quote(FetchError::Parse(_))));

        let wallet = MockWallet::new(USER).rejecting(WalletError::Rejected("user denied".to_string()));
        let err = flow(clean_cache(), &wallet, &MockBurner::new(U256::ZERO))
            .execute(BurnRequest::new(addr(TOKEN), amount()), &tx)
            .await
            .unwrap_err();
        assert!(matches!(err, BurnError::Wallet(WalletError::Rejected(_))));
        let state = tx.borrow().clone();
        match state {
            BurnState::Failed { reason } => assert!(reason.contains("user denied")),
            other => panic!("expected failed state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dropped_progress_receiver_does_not_stop_flow() {
        let wallet = MockWallet::new(USER);
        let burner = MockBurner::new(U256::from(1u64));
        let (tx, rx) = watch::channel(BurnState::Idle);
        drop(rx);

        let receipt = flow(clean_cache(), &wallet, &burner)
            .execute(
                BurnRequest::new(addr(TOKEN), amount()).with_summary("gm"),
                &tx,
            )
            .await
            .unwrap();

        assert_eq!(wallet.sent()[1].data, calldata::encode_burn(&addr(TOKEN), amount(), "gm"));
        assert!(matches!(*tx.borrow(), BurnState::Done { ref tx_hash } if *tx_hash == receipt.burn_tx));
    }
}
