//! Discord Adapter
//!
//! Posts burn notifications to a Discord channel webhook.

mod notifier;

pub use notifier::{DiscordConfig, DiscordNotifier};
