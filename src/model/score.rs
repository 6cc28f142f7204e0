use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::tournament::Tournament;

/// Natural identity of a score record: one player's result for one hole of
/// one round of one tournament.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScoreKey {
    pub tournament_id: i64,
    pub player_id: i64,
    pub round: i32,
    pub hole: i32,
}

impl std::fmt::Display for ScoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-r{}-h{}",
            self.tournament_id, self.player_id, self.round, self.hole
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Pending,
    Synced,
    Conflict,
}

/// One authoritative per-hole result. Only the resolver may replace an
/// existing record; superseded versions are retained, never deleted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScoreRecord {
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
    pub recorded_by: String,
    pub is_official: bool,
    pub client_timestamp: DateTime<Utc>,
    pub server_updated_at: DateTime<Utc>,
    pub device_id: String,
    pub sync_status: SyncStatus,
}

/// The editable scoring fields, used for field-level merge bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreField {
    Strokes,
    Putts,
    PenaltyStrokes,
    FairwayHit,
    GreenInRegulation,
    SandSave,
    UpAndDown,
}

pub const SCORE_FIELDS: [ScoreField; 7] = [
    ScoreField::Strokes,
    ScoreField::Putts,
    ScoreField::PenaltyStrokes,
    ScoreField::FairwayHit,
    ScoreField::GreenInRegulation,
    ScoreField::SandSave,
    ScoreField::UpAndDown,
];

impl ScoreRecord {
    #[must_use]
    pub fn key(&self) -> ScoreKey {
        ScoreKey {
            tournament_id: self.tournament_id,
            player_id: self.player_id,
            round: self.round,
            hole: self.hole,
        }
    }

    fn field_eq(&self, other: &Self, field: ScoreField) -> bool {
        match field {
            ScoreField::Strokes => self.strokes == other.strokes,
            ScoreField::Putts => self.putts == other.putts,
            ScoreField::PenaltyStrokes => self.penalty_strokes == other.penalty_strokes,
            ScoreField::FairwayHit => self.fairway_hit == other.fairway_hit,
            ScoreField::GreenInRegulation => {
                self.green_in_regulation == other.green_in_regulation
            }
            ScoreField::SandSave => self.sand_save == other.sand_save,
            ScoreField::UpAndDown => self.up_and_down == other.up_and_down,
        }
    }

    pub fn copy_field_from(&mut self, src: &Self, field: ScoreField) {
        match field {
            ScoreField::Strokes => self.strokes = src.strokes,
            ScoreField::Putts => self.putts = src.putts,
            ScoreField::PenaltyStrokes => self.penalty_strokes = src.penalty_strokes,
            ScoreField::FairwayHit => self.fairway_hit = src.fairway_hit,
            ScoreField::GreenInRegulation => {
                self.green_in_regulation = src.green_in_regulation;
            }
            ScoreField::SandSave => self.sand_save = src.sand_save,
            ScoreField::UpAndDown => self.up_and_down = src.up_and_down,
        }
    }

    /// Fields of `self` that differ from `base`.
    #[must_use]
    pub fn modified_fields(&self, base: &Self) -> Vec<ScoreField> {
        SCORE_FIELDS
            .iter()
            .copied()
            .filter(|&f| !self.field_eq(base, f))
            .collect()
    }

    /// True when the editable content and edit time match, which makes a
    /// resubmission a no-op.
    #[must_use]
    pub fn content_matches(&self, other: &Self) -> bool {
        SCORE_FIELDS.iter().all(|&f| self.field_eq(other, f))
            && self.client_timestamp == other.client_timestamp
    }

    /// Tournament score-validity rules.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the record violates hole/round bounds or the
    /// stroke ceiling for the tournament.
    pub fn validate(&self, tournament: &Tournament) -> Result<(), AppError> {
        if self.round < 1 || self.round > tournament.rounds {
            return Err(AppError::Validation(format!(
                "round {} out of range 1..={}",
                self.round, tournament.rounds
            )));
        }
        if tournament.hole(self.hole).is_none() {
            return Err(AppError::Validation(format!(
                "hole {} not on the card",
                self.hole
            )));
        }
        let max_allowed = tournament.max_allowed_strokes();
        if self.strokes < 1 || self.strokes > max_allowed {
            return Err(AppError::Validation(format!(
                "strokes {} out of range 1..={max_allowed}",
                self.strokes
            )));
        }
        if let Some(putts) = self.putts {
            if putts < 0 || putts > self.strokes {
                return Err(AppError::Validation(format!(
                    "putts {putts} inconsistent with {} strokes",
                    self.strokes
                )));
            }
        }
        if let Some(penalty) = self.penalty_strokes {
            if penalty < 0 || penalty >= self.strokes {
                return Err(AppError::Validation(format!(
                    "penalty strokes {penalty} inconsistent with {} strokes",
                    self.strokes
                )));
            }
        }
        Ok(())
    }
}

/// Audit trail entry written for every conflict resolution.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ResolutionAudit {
    pub tournament_id: i64,
    pub player_id: i64,
    pub round: i32,
    pub hole: i32,
    pub reason: crate::sync::resolver::ResolutionReason,
    pub winning_device: String,
    pub losing_device: String,
    pub resolved_at: DateTime<Utc>,
}
