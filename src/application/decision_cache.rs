//! Decision Cache
//!
//! Asymmetric TTL cache of risk verdicts wrapped around the aggregator.
//! - Conclusive verdicts (`Allow`/`Block`): longer TTL
//! - `Unknown` verdicts: short TTL so a recovered upstream is retried soon
//!
//! At most one classification runs per token. The first caller spawns it as a
//! detached task; concurrent callers wait on the same `watch` channel. A caller
//! that goes away does not cancel the computation, and its result still lands
//! in the cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::classifier::RiskAggregator;
use crate::domain::{Decision, RiskVerdict, TokenAddress};

/// Reason returned to waiters when the classification task died
pub const REASON_SCAN_FAILED: &str = "scan_failed";

/// Cache entry with TTL tracking
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub verdict: RiskVerdict,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(verdict: RiskVerdict, ttl: Duration) -> Self {
        Self {
            verdict,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.inserted_at.elapsed() < self.ttl
    }

    /// Get time remaining before expiry
    pub fn time_remaining(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.inserted_at.elapsed()).filter(|d| !d.is_zero())
    }
}

/// TTLs and capacity
#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub verdict_ttl: Duration,
    pub unknown_ttl: Duration,
    pub max_entries: usize,
}

impl CacheSettings {
    /// Default TTL for conclusive verdicts (90 seconds)
    pub const DEFAULT_VERDICT_TTL: Duration = Duration::from_secs(90);
    /// Default TTL for `Unknown` verdicts (10 seconds)
    pub const DEFAULT_UNKNOWN_TTL: Duration = Duration::from_secs(10);
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

    fn ttl_for(&self, verdict: &RiskVerdict) -> Duration {
        match verdict.decision {
            Decision::Unknown => self.unknown_ttl,
            Decision::Allow | Decision::Block => self.verdict_ttl,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            verdict_ttl: Self::DEFAULT_VERDICT_TTL,
            unknown_ttl: Self::DEFAULT_UNKNOWN_TTL,
            max_entries: Self::DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub allow_entries: usize,
    pub block_entries: usize,
    pub unknown_entries: usize,
    pub in_flight: usize,
    pub hits: u64,
    pub misses: u64,
    /// Callers that joined an in-flight computation
    pub coalesced: u64,
}

type VerdictSlot = watch::Receiver<Option<RiskVerdict>>;

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<TokenAddress, CacheEntry>,
    in_flight: HashMap<TokenAddress, VerdictSlot>,
    hits: u64,
    misses: u64,
    coalesced: u64,
}

impl CacheState {
    /// Valid verdict, evicting an expired entry on the way
    fn get(&mut self, token: &TokenAddress) -> Option<RiskVerdict> {
        match self.entries.get(token) {
            Some(entry) if entry.is_valid() => Some(entry.verdict.clone()),
            Some(_) => {
                self.entries.remove(token);
                None
            }
            None => None,
        }
    }

    fn insert(&mut self, token: TokenAddress, verdict: RiskVerdict, settings: &CacheSettings) {
        if self.entries.len() >= settings.max_entries {
            self.cleanup();
        }

        // Still at capacity after cleanup? Remove oldest entry
        if self.entries.len() >= settings.max_entries {
            self.remove_oldest();
        }

        let ttl = settings.ttl_for(&verdict);
        self.entries.insert(token, CacheEntry::new(verdict, ttl));
    }

    fn cleanup(&mut self) {
        self.entries.retain(|_, entry| entry.is_valid());
    }

    fn remove_oldest(&mut self) {
        if let Some(oldest_key) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone())
        {
            self.entries.remove(&oldest_key);
        }
    }
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the in-flight marker if classification panics
struct InFlightGuard {
    state: Arc<Mutex<CacheState>>,
    token: TokenAddress,
    armed: bool,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.armed {
            lock(&self.state).in_flight.remove(&self.token);
        }
    }
}

pub struct DecisionCache {
    aggregator: Arc<RiskAggregator>,
    settings: CacheSettings,
    state: Arc<Mutex<CacheState>>,
}

impl DecisionCache {
    pub fn new(aggregator: Arc<RiskAggregator>) -> Self {
        Self::with_settings(aggregator, CacheSettings::default())
    }

    pub fn with_settings(aggregator: Arc<RiskAggregator>, settings: CacheSettings) -> Self {
        Self {
            aggregator,
            settings,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    pub fn aggregator(&self) -> &Arc<RiskAggregator> {
        &self.aggregator
    }

    /// Cached verdict if still valid, otherwise classify (once per token)
    pub async fn get_or_compute(&self, token: &TokenAddress) -> RiskVerdict {
        let mut slot = {
            let mut state = lock(&self.state);

            if let Some(verdict) = state.get(token) {
                state.hits += 1;
                debug!(%token, "Decision cache hit");
                return verdict;
            }

            let existing = state.in_flight.get(token).cloned();
            match existing {
                Some(slot) => {
                    state.coalesced += 1;
                    debug!(%token, "Joining in-flight classification");
                    slot
                }
                None => {
                    state.misses += 1;
                    let (tx, rx) = watch::channel(None);
                    state.in_flight.insert(token.clone(), rx.clone());
                    self.spawn_classification(token.clone(), tx);
                    rx
                }
            }
        };

        let verdict = match slot.wait_for(Option::is_some).await {
            Ok(value) => (*value).clone(),
            Err(_) => None,
        };

        verdict.unwrap_or_else(|| {
            warn!(%token, "Classification task ended without a verdict");
            RiskVerdict::unknown(token.clone(), REASON_SCAN_FAILED)
        })
    }

    fn spawn_classification(&self, token: TokenAddress, tx: watch::Sender<Option<RiskVerdict>>) {
        let aggregator = Arc::clone(&self.aggregator);
        let state = Arc::clone(&self.state);
        let settings = self.settings;

        tokio::spawn(async move {
            let mut guard = InFlightGuard {
                state: Arc::clone(&state),
                token: token.clone(),
                armed: true,
            };

            let verdict = aggregator.classify(&token).await;

            {
                let mut state = lock(&state);
                state.insert(token.clone(), verdict.clone(), &settings);
                state.in_flight.remove(&token);
                guard.armed = false;
            }

            tx.send_replace(Some(verdict));
        });
    }

    /// Drop a token's verdict so the next call reclassifies
    pub fn invalidate(&self, token: &TokenAddress) -> Option<RiskVerdict> {
        lock(&self.state).entries.remove(token).map(|e| e.verdict)
    }

    pub fn clear(&self) {
        lock(&self.state).entries.clear();
    }

    /// Remove expired entries
    pub fn cleanup(&self) {
        lock(&self.state).cleanup();
    }

    /// Number of entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let state = lock(&self.state);
        let total = state.entries.len();
        let valid: Vec<&CacheEntry> = state.entries.values().filter(|e| e.is_valid()).collect();
        let count = |decision: Decision| {
            valid
                .iter()
                .filter(|e| e.verdict.decision == decision)
                .count()
        };

        CacheStats {
            total_entries: total,
            valid_entries: valid.len(),
            expired_entries: total - valid.len(),
            allow_entries: count(Decision::Allow),
            block_entries: count(Decision::Block),
            unknown_entries: count(Decision::Unknown),
            in_flight: state.in_flight.len(),
            hits: state.hits,
            misses: state.misses,
            coalesced: state.coalesced,
        }
    }
}
