//! Farcaster Webhook Relay
//!
//! Authenticates Mini App wallet events and relays burn submissions and
//! confirmations to the notifier.
//!
//! Security checks, in order:
//! 1. A shared secret must be configured
//! 2. `x-farcaster-signature` must be present
//! 3. HMAC-SHA256 of the raw body must match (constant-time)
//!
//! Only then is the body parsed.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

use crate::ports::Notifier;

/// Header carrying the hex HMAC of the raw body
pub const SIGNATURE_HEADER: &str = "x-farcaster-signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Webhook secret not configured")]
    NotConfigured,

    #[error("Missing signature")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Malformed event body: {0}")]
    MalformedBody(String),
}

/// Transaction reported by the wallet
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub hash: String,
    /// Number or CAIP-2 string depending on the client
    #[serde(default)]
    pub chain_id: Option<Value>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

const TRANSACTION_SUBMITTED: &str = "wallet.transaction_submitted";
const TRANSACTION_CONFIRMED: &str = "wallet.transaction_confirmed";

/// Fields shared by both wallet transaction events
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct TransactionPayload {
    /// Number or string depending on the client
    #[serde(default)]
    fid: Option<Value>,
    transaction: WalletTransaction,
}

/// Mini App event envelope
#[derive(Debug, Clone, PartialEq)]
pub enum FarcasterEvent {
    TransactionSubmitted {
        fid: Option<Value>,
        transaction: WalletTransaction,
    },
    TransactionConfirmed {
        fid: Option<Value>,
        transaction: WalletTransaction,
    },
    /// Any other JSON body, including one without a `type`
    Other,
}

impl FarcasterEvent {
    /// Dispatch on `type`. Only the two wallet events need a transaction.
    pub fn from_value(body: Value) -> Result<Self, WebhookError> {
        let kind = body.get("type").and_then(Value::as_str).map(str::to_owned);
        let payload = |body: Value| {
            serde_json::from_value::<TransactionPayload>(body)
                .map_err(|e| WebhookError::MalformedBody(e.to_string()))
        };

        match kind.as_deref() {
            Some(TRANSACTION_SUBMITTED) => {
                let TransactionPayload { fid, transaction } = payload(body)?;
                Ok(Self::TransactionSubmitted { fid, transaction })
            }
            Some(TRANSACTION_CONFIRMED) => {
                let TransactionPayload { fid, transaction } = payload(body)?;
                Ok(Self::TransactionConfirmed { fid, transaction })
            }
            _ => Ok(Self::Other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl WebhookReply {
    fn message(message: &str) -> Self {
        Self {
            ok: true,
            message: Some(message.to_string()),
            note: None,
        }
    }

    fn ignored() -> Self {
        Self {
            ok: true,
            message: None,
            note: Some("Event ignored".to_string()),
        }
    }
}

/// Hex HMAC-SHA256 of `body`, as a sender would compute it
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

fn verify_signature(secret: &str, signature: &str, body: &[u8]) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

fn display_field(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

pub struct WebhookRelay {
    secret: Option<String>,
    notifier: Option<Arc<dyn Notifier>>,
    explorer_tx_url: String,
}

impl WebhookRelay {
    pub fn new(
        secret: Option<String>,
        notifier: Option<Arc<dyn Notifier>>,
        explorer_tx_url: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            notifier,
            explorer_tx_url: explorer_tx_url.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Authenticate and dispatch one webhook delivery
    pub async fn handle(
        &self,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<WebhookReply, WebhookError> {
        let secret = self.secret.as_deref().ok_or(WebhookError::NotConfigured)?;
        let signature = signature.ok_or(WebhookError::MissingSignature)?;

        if !verify_signature(secret, signature, body) {
            tracing::warn!(body_size = body.len(), "Webhook signature verification failed");
            return Err(WebhookError::InvalidSignature);
        }

        let body: Value = serde_json::from_slice(body)
            .map_err(|e| WebhookError::MalformedBody(e.to_string()))?;
        let event = FarcasterEvent::from_value(body)?;

        match event {
            FarcasterEvent::TransactionSubmitted { fid, transaction } => {
                tracing::info!(
                    event = "burn_tx",
                    fid = %display_field(&fid),
                    tx_hash = %transaction.hash,
                    chain = %display_field(&transaction.chain_id),
                    to = transaction.to.as_deref().unwrap_or_default(),
                    data = transaction.data.as_deref().unwrap_or_default(),
                    "Burn TX submitted"
                );
                let content = format!(
                    "🔥 **PUBS BURN - TX Submitted**\n**FID:** {}\n**Hash:** {}\n**Chain:** {}\n",
                    display_field(&fid),
                    transaction.hash,
                    display_field(&transaction.chain_id)
                );
                self.relay(&content).await;
                Ok(WebhookReply::message("Burn TX logged"))
            }
            FarcasterEvent::TransactionConfirmed { fid, transaction } => {
                tracing::info!(
                    fid = %display_field(&fid),
                    tx_hash = %transaction.hash,
                    "Burn TX confirmed"
                );
                let content = format!(
                    "🎉 **Burn Confirmed!**\n**FID:** {}\n**TX:** {}{}",
                    display_field(&fid),
                    self.explorer_tx_url,
                    transaction.hash
                );
                self.relay(&content).await;
                Ok(WebhookReply::message("Burn TX confirmed"))
            }
            FarcasterEvent::Other => {
                tracing::debug!("Ignoring webhook event");
                Ok(WebhookReply::ignored())
            }
        }
    }

    async fn relay(&self, content: &str) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if let Err(e) = notifier.notify(content).await {
            tracing::warn!("Notification relay failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::notifier::MockNotifier;
    use crate::ports::NotifyError;

    const SECRET: &str = "test-secret";

    fn submitted_body() -> Vec<u8> {
        serde_json::json!({
            "type": "wallet.transaction_submitted",
            "fid": 390403,
            "transaction": {
                "hash": "0xabc",
                "chainId": 8453,
                "to": "0x9999999999999999999999999999999999999999",
                "data": "0x"
            }
        })
        .to_string()
        .into_bytes()
    }

    fn relay_with(notifier: Option<MockNotifier>) -> WebhookRelay {
        WebhookRelay::new(
            Some(SECRET.to_string()),
            notifier.map(|n| Arc::new(n) as Arc<dyn Notifier>),
            "https://basescan.org/tx/",
        )
    }

    #[test]
    fn test_sign_and_verify() {
        let body = b"{\"type\":\"x\"}";
        let sig = sign_payload(SECRET, body);
        assert_eq!(sig.len(), 64);
        assert!(verify_signature(SECRET, &sig, body));
        assert!(!verify_signature("other", &sig, body));
        assert!(!verify_signature(SECRET, "not-hex", body));
        assert!(!verify_signature(SECRET, &sig[..62], body));
    }

    #[tokio::test]
    async fn test_not_configured_checked_first() {
        let relay = WebhookRelay::new(None, None, "https://basescan.org/tx/");
        assert!(!relay.is_configured());
        assert_eq!(
            relay.handle(None, b"{}").await,
            Err(WebhookError::NotConfigured)
        );

        let relay = WebhookRelay::new(Some(String::new()), None, "https://basescan.org/tx/");
        assert_eq!(
            relay.handle(Some("00"), b"{}").await,
            Err(WebhookError::NotConfigured)
        );
    }

    #[tokio::test]
    async fn test_missing_and_invalid_signature() {
        let relay = relay_with(None);
        let body = submitted_body();

        assert_eq!(
            relay.handle(None, &body).await,
            Err(WebhookError::MissingSignature)
        );
        let wrong = sign_payload("wrong-secret", &body);
        assert_eq!(
            relay.handle(Some(wrong.as_str()), &body).await,
            Err(WebhookError::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn test_malformed_body_after_valid_signature() {
        let relay = relay_with(None);
        let body = b"not json";
        let sig = sign_payload(SECRET, body);

        assert!(matches!(
            relay.handle(Some(sig.as_str()), body).await,
            Err(WebhookError::MalformedBody(_))
        ));
    }

    #[tokio::test]
    async fn test_submitted_event_notifies() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|content| {
                content.starts_with("🔥 **PUBS BURN - TX Submitted**")
                    && content.contains("**FID:** 390403")
                    && content.contains("**Hash:** 0xabc")
                    && content.contains("**Chain:** 8453")
            })
            .times(1)
            .returning(|_| Ok(()));

        let relay = relay_with(Some(notifier));
        let body = submitted_body();
        let sig = sign_payload(SECRET, &body);

        let reply = relay.handle(Some(sig.as_str()), &body).await.unwrap();
        assert!(reply.ok);
        assert_eq!(reply.message.as_deref(), Some("Burn TX logged"));
    }

    #[tokio::test]
    async fn test_confirmed_event_links_explorer() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|content| content.contains("**TX:** https://basescan.org/tx/0xdef"))
            .times(1)
            .returning(|_| Ok(()));

        let relay = relay_with(Some(notifier));
        let body = serde_json::json!({
            "type": "wallet.transaction_confirmed",
            "fid": 7,
            "transaction": { "hash": "0xdef", "chainId": "eip155:8453" }
        })
        .to_string();
        let sig = sign_payload(SECRET, body.as_bytes());

        let reply = relay.handle(Some(sig.as_str()), body.as_bytes()).await.unwrap();
        assert_eq!(reply.message.as_deref(), Some("Burn TX confirmed"));
    }

    #[tokio::test]
    async fn test_notifier_failure_is_not_surfaced() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .times(1)
            .returning(|_| Err(NotifyError::Delivery("discord down".to_string())));

        let relay = relay_with(Some(notifier));
        let body = submitted_body();
        let sig = sign_payload(SECRET, &body);

        assert!(relay.handle(Some(sig.as_str()), &body).await.unwrap().ok);
    }

    #[tokio::test]
    async fn test_other_events_ignored() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);

        let relay = relay_with(Some(notifier));
        let body = br#"{"type":"frame_added","fid":1}"#;
        let sig = sign_payload(SECRET, body);

        let reply = relay.handle(Some(sig.as_str()), body).await.unwrap();
        assert_eq!(reply.note.as_deref(), Some("Event ignored"));
        assert!(reply.message.is_none());
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({"ok": true, "note": "Event ignored"})
        );
    }

    #[tokio::test]
    async fn test_untyped_body_is_ignored() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);

        let relay = relay_with(Some(notifier));
        let bodies: [&[u8]; 4] = [br#"{"fid": 1}"#, br#"{"type": 5}"#, b"[]", b"null"];
        for body in bodies {
            let sig = sign_payload(SECRET, body);
            let reply = relay.handle(Some(sig.as_str()), body).await.unwrap();
            assert_eq!(reply.note.as_deref(), Some("Event ignored"));
        }
    }

    #[tokio::test]
    async fn test_string_fid_accepted() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|content| content.contains("**FID:** 390403") && content.contains("**Chain:** unknown"))
            .times(1)
            .returning(|_| Ok(()));

        let relay = relay_with(Some(notifier));
        let body = serde_json::json!({
            "type": "wallet.transaction_submitted",
            "fid": "390403",
            "transaction": { "hash": "0xabc" }
        })
        .to_string();
        let sig = sign_payload(SECRET, body.as_bytes());

        let reply = relay.handle(Some(sig.as_str()), body.as_bytes()).await.unwrap();
        assert_eq!(reply.message.as_deref(), Some("Burn TX logged"));
    }

    #[test]
    fn test_wallet_event_without_transaction_is_malformed() {
        let body = serde_json::json!({"type": "wallet.transaction_confirmed", "fid": 1});
        assert!(matches!(
            FarcasterEvent::from_value(body),
            Err(WebhookError::MalformedBody(_))
        ));
    }
}
