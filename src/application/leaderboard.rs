//! Leaderboard Service
//!
//! Top burners ranked from the burner contract's event logs. Results are kept
//! for a short refresh window so page loads do not each hit the explorer.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::{rank_burners, LeaderboardEntry};
use crate::ports::{BurnLogSource, FetchError};

/// How long a ranking is served before the logs are fetched again
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(20);

struct Snapshot {
    fetched_at: Instant,
    rows: Vec<LeaderboardEntry>,
}

pub struct LeaderboardService {
    source: Arc<dyn BurnLogSource>,
    refresh_interval: Duration,
    snapshot: Mutex<Option<Snapshot>>,
}

impl LeaderboardService {
    pub fn new(source: Arc<dyn BurnLogSource>) -> Self {
        Self {
            source,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            snapshot: Mutex::new(None),
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Top burners, served from the snapshot while it is fresh
    pub async fn top_burners(&self) -> Result<Vec<LeaderboardEntry>, FetchError> {
        if let Some(rows) = self.fresh_snapshot() {
            tracing::debug!("Leaderboard served from snapshot");
            return Ok(rows);
        }

        let logs = self.source.burn_logs().await?;
        let rows = rank_burners(&logs);
        tracing::info!("Leaderboard refreshed: {} logs, {} burners", logs.len(), rows.len());

        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Snapshot {
            fetched_at: Instant::now(),
            rows: rows.clone(),
        });
        Ok(rows)
    }

    fn fresh_snapshot(&self) -> Option<Vec<LeaderboardEntry>> {
        let guard = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|s| s.fetched_at.elapsed() < self.refresh_interval)
            .map(|s| s.rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BurnLog;
    use crate::ports::mocks::MockBurnLogs;

    const EVENT_SIG: &str = "0x1f0b4d2c3e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c1d2e3f4a5b6c7d8e9f0a1b";

    fn log_for(wallet_hex: &str) -> BurnLog {
        BurnLog::new(vec![
            EVENT_SIG.to_string(),
            format!("0x000000000000000000000000{}", wallet_hex),
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn test_ranks_and_caches() {
        let a = "a".repeat(40);
        let b = "b".repeat(40);
        let source = MockBurnLogs::new(vec![log_for(&b), log_for(&a), log_for(&b)]);
        let service = LeaderboardService::new(Arc::new(source.clone()));

        let rows = service.top_burners().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].wallet, format!("0x{}", b));
        assert_eq!(rows[0].score, 2);
        assert_eq!(rows[1].score, 1);

        service.top_burners().await.unwrap();
        assert_eq!(source.call_count(), 1);

        tokio::time::advance(DEFAULT_REFRESH_INTERVAL + Duration::from_secs(1)).await;
        service.top_burners().await.unwrap();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let source = MockBurnLogs::failing(FetchError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        });
        let service = LeaderboardService::new(Arc::new(source));

        assert!(matches!(
            service.top_burners().await,
            Err(FetchError::Status { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_logs() {
        let service = LeaderboardService::new(Arc::new(MockBurnLogs::new(Vec::new())));
        assert!(service.top_burners().await.unwrap().is_empty());
    }
}
