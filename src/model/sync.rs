use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::score::{ScoreKey, ScoreRecord, SyncStatus};

/// One hole edit as a client submits it. `id` is whatever the client minted
/// locally; the server matches on natural identity, never on `id`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ScoreEdit {
    #[serde(default)]
    pub id: Option<String>,
    pub tournament_id: i64,
    pub player_id: i64,
    pub round: i32,
    pub hole: i32,
    pub strokes: i32,
    #[serde(default)]
    pub putts: Option<i32>,
    #[serde(default)]
    pub penalty_strokes: Option<i32>,
    #[serde(default)]
    pub fairway_hit: Option<bool>,
    #[serde(default)]
    pub green_in_regulation: Option<bool>,
    #[serde(default)]
    pub sand_save: Option<bool>,
    #[serde(default)]
    pub up_and_down: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl ScoreEdit {
    #[must_use]
    pub fn key(&self) -> ScoreKey {
        ScoreKey {
            tournament_id: self.tournament_id,
            player_id: self.player_id,
            round: self.round,
            hole: self.hole,
        }
    }

    /// The id echoed back in the per-item result: the client's if it sent
    /// one, otherwise the natural identity.
    #[must_use]
    pub fn result_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.key().to_string())
    }

    /// Materialize a candidate authoritative record from this edit.
    #[must_use]
    pub fn to_record(
        &self,
        device_id: &str,
        recorded_by: &str,
        is_official: bool,
        now: DateTime<Utc>,
    ) -> ScoreRecord {
        ScoreRecord {
            tournament_id: self.tournament_id,
            player_id: self.player_id,
            round: self.round,
            hole: self.hole,
            strokes: self.strokes,
            putts: self.putts,
            penalty_strokes: self.penalty_strokes,
            fairway_hit: self.fairway_hit,
            green_in_regulation: self.green_in_regulation,
            sand_save: self.sand_save,
            up_and_down: self.up_and_down,
            recorded_by: recorded_by.to_string(),
            is_official,
            client_timestamp: self.updated_at,
            server_updated_at: now,
            device_id: device_id.to_string(),
            sync_status: SyncStatus::Synced,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SyncRequest {
    pub device_id: String,
    pub tournament_id: i64,
    pub player_id: i64,
    pub client_timestamp: DateTime<Utc>,
    pub scores: Vec<ScoreEdit>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Created,
    Updated,
    Conflict,
    Error,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SyncItemResult {
    pub id: String,
    pub status: SyncOutcome,
    pub entity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_data: Option<ScoreRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SyncItemResult {
    #[must_use]
    pub fn new(id: String, status: SyncOutcome, server_data: Option<ScoreRecord>) -> Self {
        Self {
            id,
            status,
            entity: "score".to_string(),
            server_data,
            error_message: None,
        }
    }

    #[must_use]
    pub fn error(id: String, message: String) -> Self {
        Self {
            id,
            status: SyncOutcome::Error,
            entity: "score".to_string(),
            server_data: None,
            error_message: Some(message),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SyncResponse {
    pub results: Vec<SyncItemResult>,
    pub server_timestamp: DateTime<Utc>,
}
