use ahash::AHashMap;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use crate::model::{Leaderboard, TournamentFormat};

pub const DEFAULT_CACHE_TTL_SECONDS: i64 = 300;

/// Cache key for one computed leaderboard view.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LeaderboardKey {
    pub tournament_id: i64,
    pub format: TournamentFormat,
    pub flight: Option<String>,
    pub round: Option<i32>,
}

#[derive(Clone)]
struct CachedBoard {
    data: Leaderboard,
    cached_time: DateTime<Utc>,
}

/// Published whenever a contributing score changes. Downstream subscribers
/// (push transport, secondary caches) re-read on receipt.
#[derive(Clone, Debug)]
pub struct LeaderboardChanged {
    pub tournament_id: i64,
    pub round: Option<i32>,
}

/// Downstream signal that a tournament's leaderboards are stale.
#[async_trait]
pub trait InvalidationHook: Send + Sync {
    async fn leaderboard_changed(&self, tournament_id: i64, round: Option<i32>);
}

/// TTL cache over computed leaderboards. Invalidation walks an explicit
/// index of the derived keys per tournament; there is no wildcard matching
/// against the key space.
pub struct LeaderboardCache {
    entries: RwLock<AHashMap<LeaderboardKey, CachedBoard>>,
    index: RwLock<AHashMap<i64, Vec<LeaderboardKey>>>,
    ttl: Duration,
    changes: broadcast::Sender<LeaderboardChanged>,
}

impl LeaderboardCache {
    #[must_use]
    pub fn new(ttl_seconds: i64) -> Self {
        let (changes, _) = broadcast::channel(256);
        Self {
            entries: RwLock::new(AHashMap::new()),
            index: RwLock::new(AHashMap::new()),
            ttl: Duration::seconds(ttl_seconds),
            changes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LeaderboardChanged> {
        self.changes.subscribe()
    }

    /// Return the cached board if it is still within the TTL.
    pub async fn get(&self, key: &LeaderboardKey) -> Option<Leaderboard> {
        let entries = self.entries.read().await;
        let cached = entries.get(key)?;
        let elapsed = Utc::now() - cached.cached_time;
        if elapsed < self.ttl {
            Some(cached.data.clone())
        } else {
            None
        }
    }

    pub async fn put(&self, key: LeaderboardKey, data: Leaderboard) {
        let mut entries = self.entries.write().await;
        let mut index = self.index.write().await;
        let derived = index.entry(key.tournament_id).or_default();
        if !derived.contains(&key) {
            derived.push(key.clone());
        }
        entries.insert(
            key,
            CachedBoard {
                data,
                cached_time: Utc::now(),
            },
        );
    }

    /// Drop every derived key whose view could include the changed round.
    /// A key with no round filter aggregates all rounds, so any change
    /// invalidates it; a round-filtered key survives changes to other
    /// rounds.
    pub async fn invalidate(&self, tournament_id: i64, round: Option<i32>) {
        let mut entries = self.entries.write().await;
        let mut index = self.index.write().await;
        let Some(derived) = index.get_mut(&tournament_id) else {
            return;
        };
        derived.retain(|key| {
            let affected = match (key.round, round) {
                (None, _) | (_, None) => true,
                (Some(cached_round), Some(changed_round)) => cached_round == changed_round,
            };
            if affected {
                entries.remove(key);
            }
            !affected
        });
        if derived.is_empty() {
            index.remove(&tournament_id);
        }
    }
}

#[async_trait]
impl InvalidationHook for LeaderboardCache {
    async fn leaderboard_changed(&self, tournament_id: i64, round: Option<i32>) {
        self.invalidate(tournament_id, round).await;
        // nobody listening is fine
        let _ = self.changes.send(LeaderboardChanged {
            tournament_id,
            round,
        });
        debug!(tournament_id, ?round, "leaderboard invalidated");
    }
}
