#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use fairway_sync::model::{
    Claims, Player, ScoreEdit, SyncRequest, Tournament, TournamentFormat, standard_holes,
};
use fairway_sync::storage::{Storage, memory::MemoryStorage};

pub fn tournament(id: i64, format: TournamentFormat, rounds: i32) -> Tournament {
    Tournament {
        tournament_id: id,
        name: format!("Test Open {id}"),
        course_name: "Pine Hollow".to_string(),
        format,
        rounds,
        holes: standard_holes(),
        max_strokes_per_hole: 12,
    }
}

pub fn player(id: i64, name: &str, handicap: f64, flight: Option<&str>) -> Player {
    Player {
        player_id: id,
        name: name.to_string(),
        handicap,
        flight: flight.map(str::to_string),
        tee: None,
    }
}

/// Tournament 1 (gross, two rounds) with a six-player field across two
/// flights.
pub async fn seeded_storage() -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .put_tournament(tournament(1, TournamentFormat::Gross, 2))
        .await
        .unwrap();
    let field = [
        (1, "Avery Hall", 8.4, Some("A")),
        (2, "Blair Quinn", 12.0, Some("A")),
        (3, "Casey Drummond", 2.1, Some("B")),
        (4, "Devon Price", 17.6, Some("B")),
        (5, "Emerson Lake", 0.0, Some("A")),
        (6, "Frankie Ode", 24.3, Some("B")),
    ];
    for (id, name, handicap, flight) in field {
        storage
            .put_player(1, player(id, name, handicap, flight))
            .await
            .unwrap();
    }
    storage
}

/// Timestamps within the test day, minutes after 09:00 UTC.
pub fn ts(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 14, 9 + minute / 60, minute % 60, 0)
        .unwrap()
}

pub fn edit(player_id: i64, round: i32, hole: i32, strokes: i32, minute: u32) -> ScoreEdit {
    ScoreEdit {
        id: None,
        tournament_id: 1,
        player_id,
        round,
        hole,
        strokes,
        putts: None,
        penalty_strokes: None,
        fairway_hit: None,
        green_in_regulation: None,
        sand_save: None,
        up_and_down: None,
        updated_at: ts(minute),
    }
}

/// A full 18 holes summing to `gross`, adjusted off par on the early holes.
pub fn round_edits(player_id: i64, round: i32, gross: i32, minute: u32) -> Vec<ScoreEdit> {
    let holes = standard_holes();
    let par_total: i32 = holes.iter().map(|h| h.par).sum();
    let extra = gross - par_total;
    holes
        .iter()
        .enumerate()
        .map(|(i, hole)| {
            let delta = if (i as i32) < extra.abs() {
                extra.signum()
            } else {
                0
            };
            edit(player_id, round, hole.hole, hole.par + delta, minute)
        })
        .collect()
}

pub fn batch(device: &str, scores: Vec<ScoreEdit>) -> SyncRequest {
    SyncRequest {
        device_id: device.to_string(),
        tournament_id: 1,
        player_id: scores.first().map(|e| e.player_id).unwrap_or(0),
        client_timestamp: Utc::now(),
        scores,
    }
}

pub fn player_claims(device: &str) -> Claims {
    Claims {
        recorded_by: device.to_string(),
        is_official: false,
    }
}

pub fn official_claims(name: &str) -> Claims {
    Claims {
        recorded_by: name.to_string(),
        is_official: true,
    }
}
