use std::collections::HashMap;

use chrono::Utc;

use crate::error::AppError;
use crate::model::{
    Leaderboard, LeaderboardEntry, NotStartedEntry, Player, PlayerStatus, PlayerTotal, RoundInfo,
    ScoreRecord, Tournament, TournamentFormat,
};
use crate::scoring::engine;

/// Build a ranked leaderboard for one tournament view.
///
/// Flight filters the player field, round filters the score set. Players
/// with no holes recorded are excluded from ranking and listed separately
/// as not started. Positions follow standard competition ranking: tied
/// players share the lower ordinal and the next distinct value's position
/// is one plus the count of strictly better players.
///
/// # Errors
///
/// Will return `Err` if the format cannot be ranked or a record references
/// an unknown hole.
pub fn build(
    players: &[Player],
    scores: &[ScoreRecord],
    tournament: &Tournament,
    format: TournamentFormat,
    flight: Option<&str>,
    round: Option<i32>,
) -> Result<Leaderboard, AppError> {
    let fielded: Vec<&Player> = players
        .iter()
        .filter(|p| flight.is_none_or(|f| p.flight.as_deref() == Some(f)))
        .collect();

    let mut by_player: HashMap<i64, Vec<ScoreRecord>> = HashMap::new();
    let mut last_updated = None;
    for score in scores {
        if score.tournament_id != tournament.tournament_id {
            continue;
        }
        if round.is_some_and(|r| score.round != r) {
            continue;
        }
        last_updated = Some(match last_updated {
            Some(seen) if seen > score.server_updated_at => seen,
            _ => score.server_updated_at,
        });
        by_player
            .entry(score.player_id)
            .or_default()
            .push(score.clone());
    }

    let rounds_in_scope = if round.is_some() { 1 } else { tournament.rounds };
    let required_holes = (tournament.holes_per_round() * rounds_in_scope) as usize;

    let mut ranked: Vec<(&Player, PlayerTotal)> = Vec::new();
    let mut not_started: Vec<NotStartedEntry> = Vec::new();
    for player in fielded {
        let records = by_player.remove(&player.player_id).unwrap_or_default();
        if records.is_empty() {
            not_started.push(NotStartedEntry {
                player_id: player.player_id,
                player_name: player.name.clone(),
                flight_name: player.flight.clone(),
            });
            continue;
        }
        let total = engine::aggregate(&records, format, tournament, player, rounds_in_scope)?;
        ranked.push((player, total));
    }

    // stroke formats rank ascending, stableford descending; name keeps the
    // listing stable without affecting positions
    ranked.sort_by(|(pa, ta), (pb, tb)| {
        let va = ta.comparison_value(format);
        let vb = tb.comparison_value(format);
        let ordering = if format == TournamentFormat::Stableford {
            vb.cmp(&va)
        } else {
            va.cmp(&vb)
        };
        ordering.then_with(|| pa.name.cmp(&pb.name))
    });

    let mut entries = Vec::with_capacity(ranked.len());
    let mut position = 0;
    let mut previous_value = None;
    for (index, (player, total)) in ranked.iter().enumerate() {
        let value = total.comparison_value(format);
        if previous_value != Some(value) {
            position = index + 1;
            previous_value = Some(value);
        }
        let (total_field, points_field) = if format == TournamentFormat::Stableford {
            (None, total.points)
        } else {
            (Some(total.comparison_value(format)), None)
        };
        entries.push(LeaderboardEntry {
            position,
            player_id: player.player_id,
            player_name: player.name.clone(),
            total: total_field,
            points: points_field,
            handicap: player.handicap,
            to_par: total.to_par,
            round_scores: total.round_totals.clone(),
            status: if total.holes_played == required_holes {
                PlayerStatus::Complete
            } else {
                PlayerStatus::InProgress
            },
            flight_name: player.flight.clone(),
        });
    }

    not_started.sort_by(|a, b| a.player_name.cmp(&b.player_name));

    Ok(Leaderboard {
        tournament_id: tournament.tournament_id,
        tournament_name: tournament.name.clone(),
        format,
        course_name: tournament.course_name.clone(),
        last_updated: last_updated.unwrap_or_else(Utc::now),
        leaderboard: entries,
        not_started,
        round_info: RoundInfo {
            rounds: tournament.rounds,
            round,
            holes_per_round: tournament.holes_per_round(),
        },
    })
}
