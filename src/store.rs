use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use crate::error::Result;
use crate::types::PlayerStats;

/// JSON-document store for the squad collection. Reads degrade to an
/// empty collection so the dashboard always has something to render;
/// writes rewrite the whole pretty-printed document in one atomic step.
/// Record order is insertion order — sorting is the caller's concern.
pub struct Store {
    path: PathBuf,
    /// Serializes read-modify-write cycles so concurrent upserts for
    /// different players cannot clobber each other's records.
    write_lock: Mutex<()>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        })
    }

    /// The full persisted collection, in insertion order. A missing,
    /// unreadable, or corrupt document yields an empty collection and a
    /// warning — never an error to the caller.
    pub async fn read_all(&self) -> Vec<PlayerStats> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), "failed to read squad document: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(players) => players,
            Err(e) => {
                warn!(path = %self.path.display(), "squad document is not valid JSON: {e}");
                Vec::new()
            }
        }
    }

    /// Replace the record matching `record.steam_id` if present, else
    /// append, then persist the whole collection. Write failures are
    /// surfaced — the caller must not assume the record was saved.
    pub async fn upsert(&self, record: PlayerStats) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut players = self.read_all().await;
        match players.iter_mut().find(|p| p.steam_id == record.steam_id) {
            Some(slot) => *slot = record,
            None => players.push(record),
        }

        self.persist(&players).await
    }

    async fn persist(&self, players: &[PlayerStats]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir).await?;
            }
        }

        let json = serde_json::to_vec_pretty(players)?;

        // Write-then-rename so readers never observe a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchResult, OverallStats, RankInfo, RankTier};

    fn temp_store(name: &str) -> Arc<Store> {
        let path = std::env::temp_dir().join(format!(
            "squadstats-store-{name}-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        Store::new(path)
    }

    fn sample(steam_id: &str, username: &str) -> PlayerStats {
        PlayerStats {
            id: steam_id.to_string(),
            steam_id: steam_id.to_string(),
            username: username.to_string(),
            avatar_url: String::new(),
            rank: RankInfo {
                current: 12_000,
                tier: RankTier::Premier,
                icon_url: String::new(),
            },
            overall: OverallStats {
                kd_ratio: 1.05,
                win_rate: 52.0,
                headshot_percentage: 41.0,
                total_matches: 80,
                wins: 41,
                losses: 0,
                ties: 0,
                damage_per_round: 82.0,
                adr: 82.0,
                hltv_rating: 1.1,
                kast: 68.0,
            },
            history: Vec::new(),
            top_maps: Vec::new(),
        }
    }

    #[tokio::test]
    async fn missing_document_reads_empty() {
        let store = temp_store("missing");
        assert!(store.read_all().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_document_reads_empty() {
        let store = temp_store("corrupt");
        tokio::fs::write(&store.path, b"{ not json ]").await.unwrap();
        assert!(store.read_all().await.is_empty());
    }

    #[tokio::test]
    async fn upsert_appends_then_reads_back() {
        let store = temp_store("roundtrip");
        store.upsert(sample("111", "one")).await.unwrap();
        store.upsert(sample("222", "two")).await.unwrap();

        let players = store.read_all().await;
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].steam_id, "111");
        assert_eq!(players[1].steam_id, "222");
    }

    #[tokio::test]
    async fn upsert_replaces_whole_record_by_id() {
        let store = temp_store("replace");
        store.upsert(sample("111", "before")).await.unwrap();
        store.upsert(sample("111", "after")).await.unwrap();

        let players = store.read_all().await;
        assert_eq!(players.len(), 1);
        // The second payload wins outright; nothing is merged.
        assert_eq!(players[0].username, "after");
    }

    #[tokio::test]
    async fn upsert_preserves_insertion_order() {
        let store = temp_store("order");
        store.upsert(sample("333", "c")).await.unwrap();
        store.upsert(sample("111", "a")).await.unwrap();
        store.upsert(sample("333", "c2")).await.unwrap();

        let players = store.read_all().await;
        let ids: Vec<_> = players.iter().map(|p| p.steam_id.as_str()).collect();
        assert_eq!(ids, vec!["333", "111"]);
    }

    #[tokio::test]
    async fn document_is_pretty_printed() {
        let store = temp_store("pretty");
        store.upsert(sample("111", "one")).await.unwrap();

        let text = tokio::fs::read_to_string(&store.path).await.unwrap();
        assert!(text.contains('\n'), "document should be human-readable");
        assert!(text.contains("\"steamId\""));
    }

    #[test]
    fn match_result_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&MatchResult::W).unwrap(), "\"W\"");
        assert_eq!(serde_json::to_string(&MatchResult::L).unwrap(), "\"L\"");
    }
}
