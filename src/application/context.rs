//! Service Context
//!
//! Everything a request handler or CLI command needs, built once from the
//! loaded `Config` at process start and shared behind `Arc`s. There are no
//! global singletons; tests assemble a context from mocks instead.

use std::sync::Arc;

use thiserror::Error;

use super::burn_flow::BurnFlow;
use super::classifier::{Blocklist, RiskAggregator, SignalSources};
use super::decision_cache::{CacheSettings, DecisionCache};
use super::leaderboard::LeaderboardService;
use super::manifest::MiniAppManifest;
use super::portfolio::PortfolioService;
use super::scan::ScanService;
use super::webhook_relay::WebhookRelay;
use crate::adapters::basescan::{BaseScanClient, BaseScanConfig};
use crate::adapters::covalent::{CovalentClient, CovalentConfig};
use crate::adapters::discord::{DiscordConfig, DiscordNotifier};
use crate::adapters::evm_rpc::{BurnerContract, EvmRpcClient, EvmRpcConfig, EvmRpcError};
use crate::adapters::goplus::{GoPlusClient, GoPlusConfig};
use crate::adapters::market_data::{
    CoinGeckoClient, CoinGeckoConfig, DexscreenerClient, DexscreenerConfig,
};
use crate::config::Config;
use crate::domain::TokenAddress;
use crate::ports::{BurnerPort, FetchError, Notifier, NotifyError, WalletPort};

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] FetchError),

    #[error("Failed to build RPC client: {0}")]
    Rpc(#[from] EvmRpcError),

    #[error("Failed to build notifier: {0}")]
    Notifier(#[from] NotifyError),
}

/// Burner contract address plus its read port
#[derive(Clone)]
pub struct BurnerHandle {
    pub address: TokenAddress,
    pub port: Arc<dyn BurnerPort>,
}

#[derive(Clone)]
pub struct ServiceContext {
    pub scan: Arc<ScanService>,
    pub portfolio: Arc<PortfolioService>,
    pub webhook: Arc<WebhookRelay>,
    /// Absent when no burner contract is configured
    pub leaderboard: Option<Arc<LeaderboardService>>,
    pub burner: Option<BurnerHandle>,
    pub manifest: Option<MiniAppManifest>,
}

impl ServiceContext {
    /// Wire the production adapters described by `config`
    pub fn from_config(config: &Config) -> Result<Self, ContextError> {
        let http_timeout = config.http_timeout();
        let blocklist = Blocklist::new(config.blocklist());
        let burner_address = config.burner_address();

        let basescan = BaseScanClient::new(BaseScanConfig {
            api_url: config.apis.basescan_url.clone(),
            api_key: config.apis.basescan_api_key.clone(),
            timeout: http_timeout,
        })?;
        let basescan = match &burner_address {
            Some(address) => basescan.with_burner(address.clone()),
            None => basescan,
        };
        let basescan = Arc::new(basescan);

        let honeypot = Arc::new(GoPlusClient::new(GoPlusConfig {
            api_url: config.apis.honeypot_url.clone(),
            chain_id: config.chain.chain_id,
            timeout: http_timeout,
        })?);
        let liquidity = Arc::new(DexscreenerClient::new(DexscreenerConfig {
            api_url: config.apis.dexscreener_url.clone(),
            chain: config.apis.dexscreener_chain.clone(),
            timeout: http_timeout,
        })?);

        let rpc = EvmRpcClient::with_config(EvmRpcConfig {
            rpc_url: config.chain.rpc_url.clone(),
            timeout: http_timeout,
            max_retries: config.apis.rpc_max_retries,
            ..EvmRpcConfig::default()
        })?;

        let aggregator = RiskAggregator::new(
            blocklist.clone(),
            SignalSources {
                verification: basescan.clone(),
                honeypot,
                liquidity,
            },
        )
        .with_policy(config.risk_policy())
        .with_fetch_timeout(config.fetch_timeout());

        let cache = Arc::new(DecisionCache::with_settings(
            Arc::new(aggregator),
            CacheSettings {
                verdict_ttl: config.verdict_ttl(),
                unknown_ttl: config.unknown_ttl(),
                max_entries: config.cache.max_entries,
            },
        ));

        let scan = Arc::new(ScanService::new(cache, Arc::new(rpc.clone())));

        let portfolio = Arc::new(PortfolioService::new(
            Arc::new(CovalentClient::new(CovalentConfig {
                api_url: config.apis.covalent_url.clone(),
                chain_name: config.apis.covalent_chain.clone(),
                api_key: config.apis.covalent_api_key.clone(),
                timeout: http_timeout,
            })?),
            Arc::new(CoinGeckoClient::new(CoinGeckoConfig {
                api_url: config.apis.coingecko_url.clone(),
                platform: config.apis.coingecko_platform.clone(),
                timeout: http_timeout,
            })?),
            blocklist,
        ));

        let notifier: Option<Arc<dyn Notifier>> = match &config.webhook.discord_webhook_url {
            Some(url) => Some(Arc::new(DiscordNotifier::new(DiscordConfig::new(url.clone()))?)),
            None => None,
        };
        let webhook = Arc::new(WebhookRelay::new(
            config.webhook.secret.clone(),
            notifier,
            config.chain.explorer_tx_url.clone(),
        ));

        let leaderboard = burner_address
            .as_ref()
            .map(|_| Arc::new(LeaderboardService::new(basescan.clone())));
        let burner = burner_address.map(|address| BurnerHandle {
            port: Arc::new(BurnerContract::new(rpc, address.clone())),
            address,
        });

        if leaderboard.is_none() {
            tracing::warn!("No burner contract configured; leaderboard and burns disabled");
        }

        Ok(Self {
            scan,
            portfolio,
            webhook,
            leaderboard,
            burner,
            manifest: config.manifest.as_ref().map(MiniAppManifest::from),
        })
    }

    pub fn cache(&self) -> &Arc<DecisionCache> {
        self.scan.cache()
    }

    /// Burn flow bound to the given wallet provider, if a burner is configured
    pub fn burn_flow(&self, wallet: Arc<dyn WalletPort>) -> Option<BurnFlow> {
        let burner = self.burner.as_ref()?;
        Some(BurnFlow::new(
            Arc::clone(self.cache()),
            wallet,
            Arc::clone(&burner.port),
            burner.address.clone(),
        ))
    }
}
