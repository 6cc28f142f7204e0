use std::collections::BTreeMap;

use crate::error::AppError;
use crate::model::{Player, PlayerTotal, ScoreRecord, Tournament, TournamentFormat};

/// Strokes a player gives or gets on one hole, allocated by stroke index:
/// one stroke per full 18 of playing handicap on every hole, plus one more
/// on the hardest `handicap mod 18` holes. This is the card method, not a
/// uniform `handicap / 18` deduction, which misallocates on short rounds.
#[must_use]
pub fn allocated_strokes(handicap: f64, stroke_index: i32) -> i32 {
    let playing = handicap.round().max(0.0) as i32;
    let base = playing / 18;
    let remainder = playing % 18;
    base + i32::from(stroke_index <= remainder)
}

/// Stableford points for one hole from the net score against par.
#[must_use]
pub fn stableford_points(strokes: i32, net_par: i32) -> i32 {
    match strokes - net_par {
        d if d <= -3 => 5,
        -2 => 4,
        -1 => 3,
        0 => 2,
        1 => 1,
        _ => 0,
    }
}

/// Aggregate one player's hole records into format totals.
///
/// `rounds_in_scope` is how many rounds the caller is looking at (1 when
/// filtered to a single round, the tournament's round count otherwise); it
/// decides whether the record set is complete. Missing holes are excluded
/// from totals; `to_par` stays `None` for net until every hole in scope is
/// present, and for gross reflects only the holes actually played.
///
/// # Errors
///
/// Will return `Err` for the match format (not rankable by totals) or for a
/// record referencing a hole that is not on the card.
pub fn aggregate(
    records: &[ScoreRecord],
    format: TournamentFormat,
    tournament: &Tournament,
    player: &Player,
    rounds_in_scope: i32,
) -> Result<PlayerTotal, AppError> {
    if format == TournamentFormat::Match {
        return Err(AppError::Validation(
            "match play is not scored by totals".to_string(),
        ));
    }

    let mut gross = 0;
    let mut net = 0;
    let mut points = 0;
    let mut par_played = 0;
    let mut round_totals: BTreeMap<i32, i32> = BTreeMap::new();

    for record in records {
        let hole = tournament.hole(record.hole).ok_or_else(|| {
            AppError::NotFound(format!("hole {} on tournament {}", record.hole, record.tournament_id))
        })?;
        let allocation = allocated_strokes(player.handicap, hole.stroke_index);

        gross += record.strokes;
        net += record.strokes - allocation;
        points += stableford_points(record.strokes, hole.par + allocation);
        par_played += hole.par;

        let hole_value = match format {
            TournamentFormat::Gross => record.strokes,
            TournamentFormat::Net => record.strokes - allocation,
            TournamentFormat::Stableford => stableford_points(record.strokes, hole.par + allocation),
            TournamentFormat::Match => unreachable!(),
        };
        *round_totals.entry(record.round).or_insert(0) += hole_value;
    }

    let holes_played = records.len();
    let required = (tournament.holes_per_round() * rounds_in_scope) as usize;
    let complete = holes_played == required;

    let to_par = match format {
        TournamentFormat::Gross => (holes_played > 0).then_some(gross - par_played),
        TournamentFormat::Net => complete.then(|| net - tournament.par_total() * rounds_in_scope),
        _ => None,
    };

    Ok(PlayerTotal {
        player_id: player.player_id,
        holes_played,
        gross,
        net: (holes_played > 0).then_some(net),
        points: (holes_played > 0).then_some(points),
        to_par,
        round_totals,
    })
}
