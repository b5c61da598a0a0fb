//! Notifier Port
//!
//! Outbound chat notifications for burn events.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post a plain-text message
    async fn notify(&self, content: &str) -> Result<(), NotifyError>;
}
