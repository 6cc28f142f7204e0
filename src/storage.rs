pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::model::{Player, ResolutionAudit, ScoreKey, ScoreRecord, Tournament};

/// Outcome of a compare-and-swap write. `Stale` means the record moved under
/// the caller and nothing was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    Applied,
    Stale,
}

/// Persistence seam. The in-memory implementation in [`memory`] backs a
/// single-node deployment and the test suite; a SQL-backed implementation
/// plugs in behind the same trait.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_tournament(&self, tournament_id: i64) -> Result<Tournament, AppError>;
    async fn put_tournament(&self, tournament: Tournament) -> Result<(), AppError>;

    async fn get_player(&self, player_id: i64) -> Result<Player, AppError>;
    async fn put_player(&self, tournament_id: i64, player: Player) -> Result<(), AppError>;
    async fn get_players_for_tournament(
        &self,
        tournament_id: i64,
    ) -> Result<Vec<Player>, AppError>;

    async fn get_score(&self, key: ScoreKey) -> Result<Option<ScoreRecord>, AppError>;
    /// The version the current authoritative record superseded, if any.
    /// Used as the common ancestor for field-level merges.
    async fn get_prior_version(&self, key: ScoreKey) -> Result<Option<ScoreRecord>, AppError>;
    async fn get_scores(
        &self,
        tournament_id: i64,
        round: Option<i32>,
    ) -> Result<Vec<ScoreRecord>, AppError>;

    /// Insert the first authoritative record for an identity.
    ///
    /// Fails with [`AppError::Conflict`] if a record already exists, so a
    /// racing writer falls back to the resolve path.
    async fn insert_score(&self, record: ScoreRecord) -> Result<(), AppError>;

    /// Replace the authoritative record only if its `server_updated_at`
    /// still matches what the caller observed. The superseded version is
    /// retained, never deleted.
    async fn update_score_cas(
        &self,
        record: ScoreRecord,
        expected_server_updated_at: DateTime<Utc>,
    ) -> Result<CasOutcome, AppError>;

    async fn record_resolution(&self, audit: ResolutionAudit) -> Result<(), AppError>;
    async fn get_resolutions(
        &self,
        tournament_id: i64,
    ) -> Result<Vec<ResolutionAudit>, AppError>;
}
