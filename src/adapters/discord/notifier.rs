//! Discord notification service
//!
//! Sends plain `content` messages via the Discord Webhook API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::ports::{Notifier, NotifyError};

/// Discord notifier configuration
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Webhook URL from Discord channel settings
    pub webhook_url: String,
    pub timeout: Duration,
}

impl DiscordConfig {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct DiscordNotifier {
    webhook_url: String,
    client: Client,
}

impl DiscordNotifier {
    pub fn new(config: DiscordConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Delivery(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            webhook_url: config.webhook_url,
            client,
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, content: &str) -> Result<(), NotifyError> {
        let payload = serde_json::json!({ "content": content });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Discord API error: {} - {}", status, body);
            return Err(NotifyError::Delivery(format!("Discord returned {status}")));
        }

        tracing::debug!("Discord notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_timeout() {
        let config = DiscordConfig::new("https://discord.com/api/webhooks/1/abc");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(DiscordNotifier::new(config).is_ok());
    }
}
