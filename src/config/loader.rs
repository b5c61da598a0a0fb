//! Configuration Loader
//!
//! Loads configuration from a TOML file, applies environment overrides once,
//! then validates. The result is immutable for the life of the process.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{RiskPolicy, TokenAddress};

/// Main configuration structure matching config/default.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    pub chain: ChainSection,
    pub scan: ScanSection,
    #[serde(default)]
    pub cache: CacheSection,
    pub apis: ApisSection,
    #[serde(default)]
    pub webhook: WebhookSection,
    #[serde(default)]
    pub manifest: Option<ManifestSection>,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// HTTP server section
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Socket address to bind
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Chain section
#[derive(Debug, Clone, Deserialize)]
pub struct ChainSection {
    /// EVM chain id (Base mainnet = 8453)
    pub chain_id: u64,
    pub rpc_url: String,
    /// Burner contract, required for burns and the leaderboard
    #[serde(default)]
    pub burner_address: Option<String>,
    /// Prefix for transaction links in notifications
    #[serde(default = "default_explorer_tx_url")]
    pub explorer_tx_url: String,
}

fn default_explorer_tx_url() -> String {
    "https://basescan.org/tx/".to_string()
}

/// Risk scan section
#[derive(Debug, Clone, Deserialize)]
pub struct ScanSection {
    /// Per-fetcher timeout in milliseconds
    pub fetch_timeout_ms: u64,
    /// Pool depth below which a token is annotated `lowLiquidity`
    pub min_liquidity_usd: f64,
    /// Sell tax fraction above which `highSellTax` is raised
    pub max_sell_tax: f64,
    /// Stablecoins and official tokens that may never be burned
    #[serde(default)]
    pub blocklist: Vec<String>,
}

/// Decision cache section
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    pub verdict_ttl_secs: u64,
    pub unknown_ttl_secs: u64,
    pub max_entries: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            verdict_ttl_secs: 90,
            unknown_ttl_secs: 10,
            max_entries: 10_000,
        }
    }
}

/// Third-party API section
#[derive(Debug, Clone, Deserialize)]
pub struct ApisSection {
    pub basescan_url: String,
    #[serde(default)]
    pub basescan_api_key: String,
    /// GoPlus token-security endpoint, without chain id
    pub honeypot_url: String,
    pub dexscreener_url: String,
    /// Dexscreener chain slug
    #[serde(default = "default_dex_chain")]
    pub dexscreener_chain: String,
    pub coingecko_url: String,
    #[serde(default = "default_dex_chain")]
    pub coingecko_platform: String,
    pub covalent_url: String,
    #[serde(default)]
    pub covalent_api_key: String,
    #[serde(default = "default_covalent_chain")]
    pub covalent_chain: String,
    /// Transport timeout for every REST client in milliseconds
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,
    #[serde(default = "default_rpc_max_retries")]
    pub rpc_max_retries: u32,
}

fn default_dex_chain() -> String {
    "base".to_string()
}

fn default_covalent_chain() -> String {
    "base-mainnet".to_string()
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_rpc_max_retries() -> u32 {
    3
}

/// Farcaster webhook section (optional)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WebhookSection {
    /// HMAC secret; the webhook endpoint answers 503 without it
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub discord_webhook_url: Option<String>,
}

/// Farcaster Mini App manifest section (optional)
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestSection {
    pub account_association: AccountAssociation,
    pub name: String,
    pub description: String,
    pub icon_url: String,
    pub home_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountAssociation {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file with process environment overrides
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, |name| std::env::var(name).ok())
}

/// Parse, override and validate. `lookup` resolves environment variables.
pub fn parse_config<F>(content: &str, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config = toml::from_str(content)?;
    config.apply_overrides(lookup);
    config.validate()?;
    Ok(config)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    /// Apply environment overrides. Empty variables are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_empty(lookup("RPC_URL_BASE")) {
            self.chain.rpc_url = url;
        }
        if let Some(key) = non_empty(lookup("BASESCAN_API_KEY")) {
            self.apis.basescan_api_key = key;
        }
        if let Some(url) = non_empty(lookup("HONEYPOT_API")) {
            self.apis.honeypot_url = url;
        }
        if let Some(list) = non_empty(lookup("STABLECOINS_LIST")) {
            self.scan.blocklist = list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(address) = non_empty(lookup("BURNER_CONTRACT_ADDRESS")) {
            self.chain.burner_address = Some(address);
        }
        if let Some(secret) = non_empty(lookup("FARCASTER_WEBHOOK_SECRET")) {
            self.webhook.secret = Some(secret);
        }
        if let Some(url) = non_empty(lookup("DISCORD_WEBHOOK_URL")) {
            self.webhook.discord_webhook_url = Some(url);
        }
        if let Some(key) = non_empty(lookup("COVALENT_API_KEY")) {
            self.apis.covalent_api_key = key;
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "server.bind must be a socket address, got {:?}",
                self.server.bind
            )));
        }

        let urls = [
            ("chain.rpc_url", &self.chain.rpc_url),
            ("apis.basescan_url", &self.apis.basescan_url),
            ("apis.honeypot_url", &self.apis.honeypot_url),
            ("apis.dexscreener_url", &self.apis.dexscreener_url),
            ("apis.coingecko_url", &self.apis.coingecko_url),
            ("apis.covalent_url", &self.apis.covalent_url),
        ];
        for (name, url) in urls {
            if url.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} cannot be empty",
                    name
                )));
            }
        }

        if let Some(burner) = &self.chain.burner_address {
            TokenAddress::parse(burner).map_err(|e| {
                ConfigError::ValidationError(format!("chain.burner_address: {}", e))
            })?;
        }

        for entry in &self.scan.blocklist {
            TokenAddress::parse(entry).map_err(|e| {
                ConfigError::ValidationError(format!("scan.blocklist: {}", e))
            })?;
        }

        if self.scan.fetch_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "scan.fetch_timeout_ms must be > 0".to_string(),
            ));
        }

        if self.apis.http_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "apis.http_timeout_ms must be > 0".to_string(),
            ));
        }

        if self.scan.min_liquidity_usd < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "scan.min_liquidity_usd must be >= 0, got {}",
                self.scan.min_liquidity_usd
            )));
        }

        if !(0.0..=1.0).contains(&self.scan.max_sell_tax) {
            return Err(ConfigError::ValidationError(format!(
                "scan.max_sell_tax must be 0-1, got {}",
                self.scan.max_sell_tax
            )));
        }

        if self.cache.verdict_ttl_secs == 0 || self.cache.unknown_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "cache TTLs must be > 0".to_string(),
            ));
        }

        if self.cache.unknown_ttl_secs > self.cache.verdict_ttl_secs {
            return Err(ConfigError::ValidationError(format!(
                "cache.unknown_ttl_secs ({}) must not exceed cache.verdict_ttl_secs ({})",
                self.cache.unknown_ttl_secs, self.cache.verdict_ttl_secs
            )));
        }

        if self.cache.max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "cache.max_entries must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.scan.fetch_timeout_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.apis.http_timeout_ms)
    }

    pub fn verdict_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.verdict_ttl_secs)
    }

    pub fn unknown_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.unknown_ttl_secs)
    }

    pub fn risk_policy(&self) -> RiskPolicy {
        RiskPolicy::new(self.scan.min_liquidity_usd, self.scan.max_sell_tax)
    }

    /// Normalized blocklist; entries were checked by `validate`
    pub fn blocklist(&self) -> Vec<TokenAddress> {
        self.scan
            .blocklist
            .iter()
            .filter_map(|entry| TokenAddress::parse(entry).ok())
            .collect()
    }

    pub fn burner_address(&self) -> Option<TokenAddress> {
        self.chain
            .burner_address
            .as_deref()
            .and_then(|a| TokenAddress::parse(a).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[server]
bind = "127.0.0.1:3000"

[chain]
chain_id = 8453
rpc_url = "https://mainnet.base.org"
burner_address = "0x1111111111111111111111111111111111111111"

[scan]
fetch_timeout_ms = 6000
min_liquidity_usd = 30000.0
max_sell_tax = 0.10
blocklist = [
    "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
    "0x4200000000000000000000000000000000000006",
]

[cache]
verdict_ttl_secs = 90
unknown_ttl_secs = 10
max_entries = 10000

[apis]
basescan_url = "https://api.basescan.org/api"
honeypot_url = "https://api.gopluslabs.io/api/v1/token_security"
dexscreener_url = "https://api.dexscreener.com/latest/dex/tokens"
coingecko_url = "https://api.coingecko.com/api/v3/simple/token_price"
covalent_url = "https://api.covalenthq.com/v1"

[logging]
level = "info"
"#
        .to_string()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_config().as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.chain.chain_id, 8453);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(6));
        assert_eq!(config.verdict_ttl(), Duration::from_secs(90));
        assert_eq!(config.scan.blocklist.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_parse_error() {
        let result = parse_config("[chain\nchain_id = ", no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_optional_sections_default() {
        let config = parse_config(&create_valid_config(), no_env).unwrap();
        assert!(config.manifest.is_none());
        assert!(config.webhook.secret.is_none());
        assert_eq!(config.apis.covalent_chain, "base-mainnet");
        assert_eq!(config.apis.rpc_max_retries, 3);
    }

    #[test]
    fn test_blocklist_is_normalized() {
        let config = parse_config(&create_valid_config(), no_env).unwrap();
        let blocklist = config.blocklist();
        assert_eq!(
            blocklist[0].as_str(),
            "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913"
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RPC_URL_BASE", "https://rpc.example.test"),
            ("BASESCAN_API_KEY", "scan-key"),
            ("STABLECOINS_LIST", "0xdac17f958d2ee523a2206206994597c13d831ec7, ,"),
            ("FARCASTER_WEBHOOK_SECRET", "s3cret"),
            ("DISCORD_WEBHOOK_URL", ""),
        ]
        .into_iter()
        .collect();

        let config = parse_config(&create_valid_config(), |name| {
            env.get(name).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.chain.rpc_url, "https://rpc.example.test");
        assert_eq!(config.apis.basescan_api_key, "scan-key");
        assert_eq!(
            config.scan.blocklist,
            vec!["0xdac17f958d2ee523a2206206994597c13d831ec7".to_string()]
        );
        assert_eq!(config.webhook.secret.as_deref(), Some("s3cret"));
        assert!(config.webhook.discord_webhook_url.is_none());
    }

    #[test]
    fn test_invalid_blocklist_entry() {
        let content = create_valid_config().replace(
            "\"0x4200000000000000000000000000000000000006\"",
            "\"0xd9aec86b65d86f6a7b5b1b0c42eff8ec28e46f2\"",
        );
        let result = parse_config(&content, no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_invalid_sell_tax() {
        let content = create_valid_config().replace("max_sell_tax = 0.10", "max_sell_tax = 10.0");
        let result = parse_config(&content, no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_unknown_ttl_cannot_exceed_verdict_ttl() {
        let content = create_valid_config().replace("unknown_ttl_secs = 10", "unknown_ttl_secs = 120");
        let result = parse_config(&content, no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let content = create_valid_config().replace("fetch_timeout_ms = 6000", "fetch_timeout_ms = 0");
        assert!(parse_config(&content, no_env).is_err());
    }

    #[test]
    fn test_bad_burner_via_env() {
        let result = parse_config(&create_valid_config(), |name| {
            (name == "BURNER_CONTRACT_ADDRESS").then(|| "burner".to_string())
        });
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_shipped_default_config_is_valid() {
        let content = include_str!("../../config/default.toml");
        let config = parse_config(content, no_env).unwrap();
        assert!(!config.scan.blocklist.is_empty());
        assert_eq!(config.risk_policy(), RiskPolicy::default());
    }
}
