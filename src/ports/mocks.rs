//! Recording mocks for every port.
//!
//! Each mock records its calls and returns programmed responses, optionally
//! after a delay so timeouts and in-flight dedup can be exercised.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::U256;
use async_trait::async_trait;

use super::chain_data::{BalanceSource, BurnLogSource, PriceSource, WalletBalance};
use super::notifier::{Notifier, NotifyError};
use super::signals::{
    FetchError, HoneypotSource, LiquiditySource, MetadataSource, TokenMeta, VerificationSource,
};
use super::wallet::{BurnerPort, TxRequest, WalletError, WalletPort};
use crate::domain::{BurnLog, FeeQuote, HoneypotReport, MarketData, TokenAddress};

fn mock_token(token: &str) -> TokenAddress {
    TokenAddress::parse(token).expect("mock token address must be valid")
}

/// Per-token programmable response with call recording
#[derive(Debug, Clone)]
struct Scripted<T> {
    calls: Arc<Mutex<Vec<TokenAddress>>>,
    default: Result<T, FetchError>,
    overrides: Arc<Mutex<HashMap<TokenAddress, Result<T, FetchError>>>>,
    delay: Option<Duration>,
}

impl<T: Clone> Scripted<T> {
    fn new(default: Result<T, FetchError>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            default,
            overrides: Arc::new(Mutex::new(HashMap::new())),
            delay: None,
        }
    }

    async fn respond(&self, token: &TokenAddress) -> Result<T, FetchError> {
        self.calls.lock().unwrap().push(token.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.overrides
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}

macro_rules! scripted_mock {
    ($(#[$meta:meta])* $name:ident, $port:ident, $method:ident, $output:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            inner: Scripted<$output>,
        }

        impl $name {
            pub fn new(response: $output) -> Self {
                Self {
                    inner: Scripted::new(Ok(response)),
                }
            }

            pub fn failing(error: FetchError) -> Self {
                Self {
                    inner: Scripted::new(Err(error)),
                }
            }

            /// Builder method to set the response for one token
            pub fn with_token(self, token: &str, response: Result<$output, FetchError>) -> Self {
                self.inner
                    .overrides
                    .lock()
                    .unwrap()
                    .insert(mock_token(token), response);
                self
            }

            /// Builder method to delay every response
            pub fn with_delay(mut self, delay: Duration) -> Self {
                self.inner.delay = Some(delay);
                self
            }

            pub fn call_count(&self) -> usize {
                self.inner.calls.lock().unwrap().len()
            }

            /// Get all recorded calls
            pub fn get_calls(&self) -> Vec<TokenAddress> {
                self.inner.calls.lock().unwrap().clone()
            }
        }

        #[async_trait]
        impl $port for $name {
            async fn $method(&self, token: &TokenAddress) -> Result<$output, FetchError> {
                self.inner.respond(token).await
            }
        }
    };
}

scripted_mock!(
    /// Mock block explorer verification lookup
    MockVerification,
    VerificationSource,
    is_verified,
    bool
);

scripted_mock!(
    /// Mock honeypot detector
    MockHoneypot,
    HoneypotSource,
    check,
    HoneypotReport
);

scripted_mock!(
    /// Mock DEX liquidity oracle
    MockLiquidity,
    LiquiditySource,
    market_data,
    MarketData
);

scripted_mock!(
    /// Mock on-chain metadata reader
    MockMetadata,
    MetadataSource,
    metadata,
    TokenMeta
);

/// Mock burn log source
#[derive(Debug, Clone)]
pub struct MockBurnLogs {
    response: Result<Vec<BurnLog>, FetchError>,
    calls: Arc<Mutex<usize>>,
}

impl MockBurnLogs {
    pub fn new(logs: Vec<BurnLog>) -> Self {
        Self {
            response: Ok(logs),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            response: Err(error),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl BurnLogSource for MockBurnLogs {
    async fn burn_logs(&self) -> Result<Vec<BurnLog>, FetchError> {
        *self.calls.lock().unwrap() += 1;
        self.response.clone()
    }
}

/// Mock balance indexer
#[derive(Debug, Clone)]
pub struct MockBalances {
    response: Result<Vec<WalletBalance>, FetchError>,
    calls: Arc<Mutex<Vec<TokenAddress>>>,
}

impl MockBalances {
    pub fn new(balances: Vec<WalletBalance>) -> Self {
        Self {
            response: Ok(balances),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            response: Err(error),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_calls(&self) -> Vec<TokenAddress> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BalanceSource for MockBalances {
    async fn balances(&self, wallet: &TokenAddress) -> Result<Vec<WalletBalance>, FetchError> {
        self.calls.lock().unwrap().push(wallet.clone());
        self.response.clone()
    }
}

/// Mock USD price feed
#[derive(Debug, Clone)]
pub struct MockPrices {
    response: Result<HashMap<TokenAddress, f64>, FetchError>,
    calls: Arc<Mutex<Vec<Vec<TokenAddress>>>>,
}

impl MockPrices {
    pub fn new() -> Self {
        Self {
            response: Ok(HashMap::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            response: Err(error),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Builder method to set a price for a token
    pub fn with_price(mut self, token: &str, usd: f64) -> Self {
        if let Ok(prices) = self.response.as_mut() {
            prices.insert(mock_token(token), usd);
        }
        self
    }

    /// Token batches requested so far
    pub fn get_calls(&self) -> Vec<Vec<TokenAddress>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockPrices {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for MockPrices {
    async fn usd_prices(
        &self,
        tokens: &[TokenAddress],
    ) -> Result<HashMap<TokenAddress, f64>, FetchError> {
        self.calls.lock().unwrap().push(tokens.to_vec());
        self.response.clone()
    }
}

/// Mock wallet provider that records submitted transactions
#[derive(Debug, Clone)]
pub struct MockWallet {
    accounts: Vec<TokenAddress>,
    receipts: Arc<Mutex<VecDeque<bool>>>,
    send_error: Option<WalletError>,
    sent: Arc<Mutex<Vec<TxRequest>>>,
}

impl MockWallet {
    pub fn new(account: &str) -> Self {
        Self {
            accounts: vec![mock_token(account)],
            receipts: Arc::new(Mutex::new(VecDeque::new())),
            send_error: None,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Wallet with no connected account
    pub fn disconnected() -> Self {
        Self {
            accounts: Vec::new(),
            receipts: Arc::new(Mutex::new(VecDeque::new())),
            send_error: None,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Builder method to script receipt outcomes in order; unscripted
    /// receipts succeed
    pub fn with_receipts(self, outcomes: Vec<bool>) -> Self {
        self.receipts.lock().unwrap().extend(outcomes);
        self
    }

    /// Builder method to make every `send_transaction` fail
    pub fn rejecting(mut self, error: WalletError) -> Self {
        self.send_error = Some(error);
        self
    }

    /// Transactions submitted so far
    pub fn sent(&self) -> Vec<TxRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletPort for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<TokenAddress>, WalletError> {
        Ok(self.accounts.clone())
    }

    async fn send_transaction(
        &self,
        _from: &TokenAddress,
        tx: TxRequest,
    ) -> Result<String, WalletError> {
        if let Some(err) = &self.send_error {
            return Err(err.clone());
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(tx);
        Ok(format!("0x{:064x}", sent.len()))
    }

    async fn wait_for_receipt(&self, _tx_hash: &str) -> Result<bool, WalletError> {
        Ok(self.receipts.lock().unwrap().pop_front().unwrap_or(true))
    }
}

/// Mock burner contract
#[derive(Debug, Clone)]
pub struct MockBurner {
    response: Result<FeeQuote, FetchError>,
    calls: Arc<Mutex<Vec<(TokenAddress, U256)>>>,
}

impl MockBurner {
    pub fn new(fee: U256) -> Self {
        Self {
            response: Ok(FeeQuote { fee, decimals: 18 }),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            response: Err(error),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_calls(&self) -> Vec<(TokenAddress, U256)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BurnerPort for MockBurner {
    async fn quote_erc20_fee(
        &self,
        token: &TokenAddress,
        amount: U256,
    ) -> Result<FeeQuote, FetchError> {
        self.calls.lock().unwrap().push((token.clone(), amount));
        self.response.clone()
    }
}

/// Notifier that keeps every message in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that records and then reports a delivery failure
    pub fn failing() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, content: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(content.to_string());
        if self.fail {
            return Err(NotifyError::Delivery("mock failure".to_string()));
        }
        Ok(())
    }
}
