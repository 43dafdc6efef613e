use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::extractor::Extract;
use crate::fetcher::Fetch;
use crate::pipeline::Acquirer;
use crate::types::RosterEntry;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRefreshStatus {
    pub steam_id: String,
    pub label: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub succeeded: usize,
    pub total: usize,
    pub players: Vec<PlayerRefreshStatus>,
}

/// Refreshes the whole roster strictly sequentially with a fixed
/// inter-player delay, to stay under the upstream site's abuse
/// detection. Deliberately not a worker pool: acquisition for player
/// N+1 never begins before player N's pipeline completes.
#[derive(Clone)]
pub struct Refresher<F, E> {
    acquirer: Acquirer<F, E>,
    roster: Vec<RosterEntry>,
    delay: Duration,
}

impl<F: Fetch, E: Extract> Refresher<F, E> {
    pub fn new(acquirer: Acquirer<F, E>, roster: Vec<RosterEntry>, delay: Duration) -> Self {
        Self { acquirer, roster, delay }
    }

    /// One pass over the roster. Per-player failures are recorded and
    /// skipped, never fatal to the batch.
    pub async fn refresh_all(&self) -> RefreshSummary {
        let total = self.roster.len();
        let mut players = Vec::with_capacity(total);
        let mut succeeded = 0usize;

        for (i, entry) in self.roster.iter().enumerate() {
            info!(steam_id = %entry.steam_id, "refreshing {}", entry.label);

            match self.acquirer.acquire(entry).await {
                Ok(_) => {
                    succeeded += 1;
                    players.push(PlayerRefreshStatus {
                        steam_id: entry.steam_id.clone(),
                        label: entry.label.clone(),
                        ok: true,
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(steam_id = %entry.steam_id, "refresh failed for {}: {e}", entry.label);
                    players.push(PlayerRefreshStatus {
                        steam_id: entry.steam_id.clone(),
                        label: entry.label.clone(),
                        ok: false,
                        error: Some(e.to_string()),
                    });
                }
            }

            // Throttle between players, not after the last one.
            if i + 1 < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!(succeeded, total, "squad refresh complete: {succeeded}/{total}");
        RefreshSummary { succeeded, total, players }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Arc;

    use super::*;
    use crate::error::{AppError, Result};
    use crate::extractor::StatsPageExtractor;
    use crate::pipeline::tests::{temp_path, test_config};
    use crate::store::Store;

    /// Serves blocked-looking markup, except for one id whose fetch fails.
    #[derive(Clone)]
    struct FlakyFetcher {
        fail_for: String,
    }

    impl Fetch for FlakyFetcher {
        fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send {
            let fail = url.contains(&self.fail_for);
            async move {
                if fail {
                    Err(AppError::Fetch("browser launch failed".to_string()))
                } else {
                    Ok("<html><body><div>Checking your browser</div></body></html>".to_string())
                }
            }
        }
    }

    fn roster(n: usize) -> Vec<RosterEntry> {
        (1..=n)
            .map(|i| RosterEntry {
                steam_id: format!("7656119900000000{i}"),
                label: format!("player{i}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn failures_are_counted_not_fatal() {
        let path = temp_path("refresh-partial");
        let _ = std::fs::remove_file(&path);
        let store = Store::new(&path);
        let roster = roster(5);

        let acquirer = Acquirer::new(
            test_config(&path),
            FlakyFetcher { fail_for: roster[2].steam_id.clone() },
            StatsPageExtractor,
            Arc::clone(&store),
        );
        let refresher = Refresher::new(acquirer, roster.clone(), Duration::ZERO);

        let summary = refresher.refresh_all().await;

        assert_eq!(summary.succeeded, 4);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.players.len(), 5);
        assert!(!summary.players[2].ok);
        assert!(summary.players[2].error.as_deref().unwrap().contains("browser launch failed"));
        assert!(summary.players.iter().filter(|p| p.ok).count() == 4);

        // The other four players still made it into the store.
        let persisted = store.read_all().await;
        assert_eq!(persisted.len(), 4);
        assert!(persisted.iter().all(|p| p.steam_id != roster[2].steam_id));
    }

    #[tokio::test]
    async fn roster_order_is_stable() {
        let path = temp_path("refresh-order");
        let _ = std::fs::remove_file(&path);
        let store = Store::new(&path);
        let roster = roster(3);

        let acquirer = Acquirer::new(
            test_config(&path),
            FlakyFetcher { fail_for: "never-matches".to_string() },
            StatsPageExtractor,
            Arc::clone(&store),
        );
        let refresher = Refresher::new(acquirer, roster.clone(), Duration::ZERO);

        let summary = refresher.refresh_all().await;
        let reported: Vec<_> = summary.players.iter().map(|p| p.steam_id.as_str()).collect();
        let expected: Vec<_> = roster.iter().map(|r| r.steam_id.as_str()).collect();
        assert_eq!(reported, expected);

        let persisted: Vec<_> = store.read_all().await;
        let stored_ids: Vec<_> = persisted.iter().map(|p| p.steam_id.as_str()).collect();
        assert_eq!(stored_ids, expected);
    }
}
