//! BaseScan Client
//!
//! Contract verification (`getsourcecode`) and burner event logs (`getLogs`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::types::{ExplorerResponse, SourceCodeEntry};
use crate::adapters::http::{build_client, send_json};
use crate::domain::{BurnLog, TokenAddress};
use crate::ports::{BurnLogSource, FetchError, VerificationSource};

/// Explorer message for an empty log query
const NO_RECORDS: &str = "No records found";

#[derive(Debug, Clone)]
pub struct BaseScanConfig {
    pub api_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for BaseScanConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.basescan.org/api".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BaseScanClient {
    config: BaseScanConfig,
    http: Client,
    /// Contract whose logs feed the leaderboard
    burner: Option<TokenAddress>,
}

impl BaseScanClient {
    pub fn new(config: BaseScanConfig) -> Result<Self, FetchError> {
        let http = build_client(config.timeout)?;
        Ok(Self {
            config,
            http,
            burner: None,
        })
    }

    /// Builder method to set the burner contract for `burn_logs`
    pub fn with_burner(mut self, burner: TokenAddress) -> Self {
        self.burner = Some(burner);
        self
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<ExplorerResponse, FetchError> {
        let request = self
            .http
            .get(&self.config.api_url)
            .query(params)
            .query(&[("apikey", self.config.api_key.as_str())]);
        send_json(request).await
    }
}

/// `true` when the first entry carries non-empty source
pub(crate) fn parse_source_code(response: ExplorerResponse) -> Result<bool, FetchError> {
    match response.result {
        Value::Array(items) => {
            let Some(first) = items.into_iter().next() else {
                return Ok(false);
            };
            let entry: SourceCodeEntry =
                serde_json::from_value(first).map_err(|e| FetchError::Parse(e.to_string()))?;
            tracing::debug!("getsourcecode contract name: {:?}", entry.contract_name);
            Ok(!entry.source_code.trim().is_empty())
        }
        Value::String(message) => Err(FetchError::Status {
            status: 200,
            body: message,
        }),
        other => Err(FetchError::Parse(format!("unexpected result: {other}"))),
    }
}

pub(crate) fn parse_logs(response: ExplorerResponse) -> Result<Vec<BurnLog>, FetchError> {
    match response.result {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<BurnLog>(item).ok())
            .collect()),
        Value::String(_) | Value::Null if response.message.starts_with(NO_RECORDS) => Ok(Vec::new()),
        Value::String(message) => Err(FetchError::Status {
            status: 200,
            body: message,
        }),
        other => Err(FetchError::Parse(format!("unexpected result: {other}"))),
    }
}

#[async_trait]
impl VerificationSource for BaseScanClient {
    async fn is_verified(&self, token: &TokenAddress) -> Result<bool, FetchError> {
        let response = self
            .query(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", token.as_str()),
            ])
            .await?;
        parse_source_code(response)
    }
}

#[async_trait]
impl BurnLogSource for BaseScanClient {
    async fn burn_logs(&self) -> Result<Vec<BurnLog>, FetchError> {
        let burner = self
            .burner
            .as_ref()
            .ok_or_else(|| FetchError::NotFound("burner contract not configured".to_string()))?;

        let response = self
            .query(&[
                ("module", "logs"),
                ("action", "getLogs"),
                ("address", burner.as_str()),
            ])
            .await?;
        parse_logs(response)
    }
}
