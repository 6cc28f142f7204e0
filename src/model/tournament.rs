use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Hard ceiling on what any tournament will accept for a single hole.
pub const MAX_RECORDABLE_STROKES: i32 = 20;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    Gross,
    Net,
    Stableford,
    Match,
}

impl TournamentFormat {
    /// Parse the `format` query parameter.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the value is not a known format.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gross" => Ok(Self::Gross),
            "net" => Ok(Self::Net),
            "stableford" => Ok(Self::Stableford),
            "match" => Ok(Self::Match),
            other => Err(AppError::Parse(format!("unknown format '{other}'"))),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gross => "gross",
            Self::Net => "net",
            Self::Stableford => "stableford",
            Self::Match => "match",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoleInfo {
    pub hole: i32,
    pub par: i32,
    /// Difficulty ranking, 1 = hardest. Unique across the layout.
    pub stroke_index: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Tournament {
    pub tournament_id: i64,
    pub name: String,
    pub course_name: String,
    pub format: TournamentFormat,
    pub rounds: i32,
    #[serde(default = "standard_holes")]
    pub holes: Vec<HoleInfo>,
    #[serde(default = "default_max_strokes")]
    pub max_strokes_per_hole: i32,
}

fn default_max_strokes() -> i32 {
    MAX_RECORDABLE_STROKES
}

/// A common par-72 layout, used when a seed file does not spell out all
/// eighteen holes. Stroke indexes alternate across the nines the way most
/// cards do.
#[must_use]
pub fn standard_holes() -> Vec<HoleInfo> {
    let pars = [4, 5, 3, 4, 4, 3, 5, 4, 4, 4, 3, 5, 4, 4, 5, 3, 4, 4];
    let stroke_indexes = [5, 9, 17, 1, 13, 15, 11, 3, 7, 6, 16, 10, 2, 12, 8, 18, 4, 14];
    pars.iter()
        .zip(stroke_indexes.iter())
        .enumerate()
        .map(|(i, (&par, &stroke_index))| HoleInfo {
            hole: (i as i32) + 1,
            par,
            stroke_index,
        })
        .collect()
}

impl Tournament {
    #[must_use]
    pub fn hole(&self, hole: i32) -> Option<&HoleInfo> {
        self.holes.iter().find(|h| h.hole == hole)
    }

    #[must_use]
    pub fn holes_per_round(&self) -> i32 {
        self.holes.len() as i32
    }

    #[must_use]
    pub fn par_total(&self) -> i32 {
        self.holes.iter().map(|h| h.par).sum()
    }

    #[must_use]
    pub fn max_allowed_strokes(&self) -> i32 {
        self.max_strokes_per_hole.min(MAX_RECORDABLE_STROKES)
    }
}
