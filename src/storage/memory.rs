use ahash::AHashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::model::{Player, ResolutionAudit, ScoreKey, ScoreRecord, Tournament};
use crate::storage::{CasOutcome, Storage};

/// Current authoritative record plus every version it superseded.
#[derive(Clone, Debug)]
struct ScoreVersions {
    current: ScoreRecord,
    superseded: Vec<ScoreRecord>,
}

/// In-memory score store. All maps sit behind their own `RwLock` so reads
/// (leaderboard recomputes) don't contend with unrelated writes.
#[derive(Default)]
pub struct MemoryStorage {
    tournaments: RwLock<AHashMap<i64, Tournament>>,
    players: RwLock<AHashMap<i64, Player>>,
    rosters: RwLock<AHashMap<i64, Vec<i64>>>,
    scores: RwLock<AHashMap<ScoreKey, ScoreVersions>>,
    resolutions: RwLock<Vec<ResolutionAudit>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_tournament(&self, tournament_id: i64) -> Result<Tournament, AppError> {
        self.tournaments
            .read()
            .await
            .get(&tournament_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("tournament {tournament_id}")))
    }

    async fn put_tournament(&self, tournament: Tournament) -> Result<(), AppError> {
        self.tournaments
            .write()
            .await
            .insert(tournament.tournament_id, tournament);
        Ok(())
    }

    async fn get_player(&self, player_id: i64) -> Result<Player, AppError> {
        self.players
            .read()
            .await
            .get(&player_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("player {player_id}")))
    }

    async fn put_player(&self, tournament_id: i64, player: Player) -> Result<(), AppError> {
        let player_id = player.player_id;
        self.players.write().await.insert(player_id, player);
        let mut rosters = self.rosters.write().await;
        let roster = rosters.entry(tournament_id).or_default();
        if !roster.contains(&player_id) {
            roster.push(player_id);
        }
        Ok(())
    }

    async fn get_players_for_tournament(
        &self,
        tournament_id: i64,
    ) -> Result<Vec<Player>, AppError> {
        let roster = self
            .rosters
            .read()
            .await
            .get(&tournament_id)
            .cloned()
            .unwrap_or_default();
        let players = self.players.read().await;
        Ok(roster
            .iter()
            .filter_map(|id| players.get(id).cloned())
            .collect())
    }

    async fn get_score(&self, key: ScoreKey) -> Result<Option<ScoreRecord>, AppError> {
        Ok(self
            .scores
            .read()
            .await
            .get(&key)
            .map(|v| v.current.clone()))
    }

    async fn get_prior_version(&self, key: ScoreKey) -> Result<Option<ScoreRecord>, AppError> {
        Ok(self
            .scores
            .read()
            .await
            .get(&key)
            .and_then(|v| v.superseded.last().cloned()))
    }

    async fn get_scores(
        &self,
        tournament_id: i64,
        round: Option<i32>,
    ) -> Result<Vec<ScoreRecord>, AppError> {
        Ok(self
            .scores
            .read()
            .await
            .values()
            .map(|v| &v.current)
            .filter(|r| r.tournament_id == tournament_id)
            .filter(|r| round.is_none_or(|rd| r.round == rd))
            .cloned()
            .collect())
    }

    async fn insert_score(&self, record: ScoreRecord) -> Result<(), AppError> {
        let tournament = self.get_tournament(record.tournament_id).await?;
        record.validate(&tournament)?;
        let mut scores = self.scores.write().await;
        let key = record.key();
        if scores.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "score {key} already has an authoritative record"
            )));
        }
        scores.insert(
            key,
            ScoreVersions {
                current: record,
                superseded: Vec::new(),
            },
        );
        Ok(())
    }

    async fn update_score_cas(
        &self,
        record: ScoreRecord,
        expected_server_updated_at: DateTime<Utc>,
    ) -> Result<CasOutcome, AppError> {
        let tournament = self.get_tournament(record.tournament_id).await?;
        record.validate(&tournament)?;
        let mut scores = self.scores.write().await;
        let key = record.key();
        let Some(versions) = scores.get_mut(&key) else {
            return Err(AppError::NotFound(format!("score {key}")));
        };
        if versions.current.server_updated_at != expected_server_updated_at {
            return Ok(CasOutcome::Stale);
        }
        let old = std::mem::replace(&mut versions.current, record);
        versions.superseded.push(old);
        Ok(CasOutcome::Applied)
    }

    async fn record_resolution(&self, audit: ResolutionAudit) -> Result<(), AppError> {
        self.resolutions.write().await.push(audit);
        Ok(())
    }

    async fn get_resolutions(
        &self,
        tournament_id: i64,
    ) -> Result<Vec<ResolutionAudit>, AppError> {
        Ok(self
            .resolutions
            .read()
            .await
            .iter()
            .filter(|a| a.tournament_id == tournament_id)
            .cloned()
            .collect())
    }
}
