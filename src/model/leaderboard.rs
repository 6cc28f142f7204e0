use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::tournament::TournamentFormat;

/// Aggregated totals for one player, recomputed on demand, never persisted.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PlayerTotal {
    pub player_id: i64,
    pub holes_played: usize,
    pub gross: i32,
    pub net: Option<i32>,
    pub points: Option<i32>,
    pub to_par: Option<i32>,
    /// Per-round totals in the format's own unit (strokes, net strokes, or
    /// points), keyed by round number.
    pub round_totals: BTreeMap<i32, i32>,
}

impl PlayerTotal {
    /// The value rankings compare on. Lower is better for stroke formats,
    /// higher for stableford; the leaderboard builder owns the direction.
    #[must_use]
    pub fn comparison_value(&self, format: TournamentFormat) -> i32 {
        match format {
            TournamentFormat::Net => self.net.unwrap_or(self.gross),
            TournamentFormat::Stableford => self.points.unwrap_or(0),
            _ => self.gross,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    InProgress,
    Complete,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LeaderboardEntry {
    pub position: usize,
    pub player_id: i64,
    pub player_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<i32>,
    pub handicap: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_par: Option<i32>,
    pub round_scores: BTreeMap<i32, i32>,
    pub status: PlayerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NotStartedEntry {
    pub player_id: i64,
    pub player_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct RoundInfo {
    pub rounds: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<i32>,
    pub holes_per_round: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Leaderboard {
    pub tournament_id: i64,
    pub tournament_name: String,
    pub format: TournamentFormat,
    pub course_name: String,
    pub last_updated: DateTime<Utc>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub not_started: Vec<NotStartedEntry>,
    pub round_info: RoundInfo,
}
