//! Burn Leaderboard
//!
//! Ranks wallets by the number of burn events the burner contract emitted
//! for them. The burner indexes the sender in `topics[1]`, left-padded to
//! 32 bytes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::token::TokenAddress;

/// Number of rows returned by `rank_burners`
pub const LEADERBOARD_SIZE: usize = 50;

/// Raw event log as returned by the block explorer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnLog {
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

impl BurnLog {
    pub fn new(topics: Vec<String>) -> Self {
        Self {
            topics,
            transaction_hash: None,
        }
    }

    /// Wallet indexed in `topics[1]`, if the topic is well-formed
    pub fn burner(&self) -> Option<TokenAddress> {
        let topic = self.topics.get(1)?;
        let digits = topic.strip_prefix("0x").unwrap_or(topic);
        if !digits.is_ascii() || digits.len() < 40 {
            return None;
        }
        let tail = &digits[digits.len() - 40..];
        TokenAddress::parse(&format!("0x{tail}")).ok()
    }
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub wallet: String,
    pub score: u64,
}

/// Count burns per wallet and return the top `LEADERBOARD_SIZE`.
///
/// Sorted by score descending, ties broken by wallet ascending so the output
/// is stable across calls. Logs without a usable `topics[1]` are skipped.
pub fn rank_burners(logs: &[BurnLog]) -> Vec<LeaderboardEntry> {
    let mut counts: HashMap<TokenAddress, u64> = HashMap::new();
    for wallet in logs.iter().filter_map(BurnLog::burner) {
        *counts.entry(wallet).or_insert(0) += 1;
    }

    let mut rows: Vec<LeaderboardEntry> = counts
        .into_iter()
        .map(|(wallet, score)| LeaderboardEntry {
            wallet: wallet.to_string(),
            score,
        })
        .collect();

    rows.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.wallet.cmp(&b.wallet)));
    rows.truncate(LEADERBOARD_SIZE);
    rows
}
