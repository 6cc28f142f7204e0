use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::{ScoreRecord, Tournament};

/// Which side wins a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Local,
    Server,
}

/// Why a resolution came out the way it did. Recorded on every resolution;
/// the losing version is discarded only with one of these on file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionReason {
    LocalNewer,
    ServerNewer,
    OfficialOverride,
    ValidationOverride,
    FieldMerge,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    /// The record to persist. For a merge this is neither input verbatim.
    pub winner: ScoreRecord,
    pub winning_side: Winner,
    pub reason: ResolutionReason,
}

/// Decide the single authoritative version for one identity.
///
/// Ordered rules, first match wins: validity override, official-scorer
/// override, field-level merge against the common ancestor, last-edit-wins,
/// then a deterministic `device_id` tie-break. The outcome depends only on
/// the two records (plus ancestor), never on arrival order.
///
/// # Errors
///
/// Will return `Err(AppError::Validation)` if both sides fail the
/// tournament's score-validity rules. That halts this record only, not the
/// batch it came in with.
pub fn resolve(
    local: &ScoreRecord,
    server: &ScoreRecord,
    ancestor: Option<&ScoreRecord>,
    tournament: &Tournament,
) -> Result<Resolution, AppError> {
    let local_valid = local.validate(tournament).is_ok();
    let server_valid = server.validate(tournament).is_ok();

    match (local_valid, server_valid) {
        (false, false) => {
            return Err(AppError::Validation(format!(
                "both versions of score {} are invalid",
                local.key()
            )));
        }
        (true, false) => {
            return Ok(Resolution {
                winner: local.clone(),
                winning_side: Winner::Local,
                reason: ResolutionReason::ValidationOverride,
            });
        }
        (false, true) => {
            return Ok(Resolution {
                winner: server.clone(),
                winning_side: Winner::Server,
                reason: ResolutionReason::ValidationOverride,
            });
        }
        (true, true) => {}
    }

    if local.is_official != server.is_official {
        let (winner, winning_side) = if local.is_official {
            (local.clone(), Winner::Local)
        } else {
            (server.clone(), Winner::Server)
        };
        return Ok(Resolution {
            winner,
            winning_side,
            reason: ResolutionReason::OfficialOverride,
        });
    }

    if let Some(base) = ancestor {
        if let Some(resolution) = try_field_merge(local, server, base) {
            return Ok(resolution);
        }
    }

    let winning_side = newer_side(local, server);
    let (winner, reason) = match winning_side {
        Winner::Local => (local.clone(), ResolutionReason::LocalNewer),
        Winner::Server => (server.clone(), ResolutionReason::ServerNewer),
    };
    Ok(Resolution {
        winner,
        winning_side,
        reason,
    })
}

/// Last-edit-wins comparison on the edit timestamps. Exactly-equal
/// timestamps fall back to lexicographic `device_id`, greater id winning,
/// so resolution is reproducible on replay from any device.
fn newer_side(local: &ScoreRecord, server: &ScoreRecord) -> Winner {
    match local.client_timestamp.cmp(&server.client_timestamp) {
        std::cmp::Ordering::Greater => Winner::Local,
        std::cmp::Ordering::Less => Winner::Server,
        std::cmp::Ordering::Equal => {
            if local.device_id > server.device_id {
                Winner::Local
            } else {
                Winner::Server
            }
        }
    }
}

/// Merge two divergent edits when each touched fields the other did not,
/// relative to the version both descend from. Overlapping fields take the
/// last-edit-wins side's value. Returns `None` when one side changed
/// nothing, or when both changed exactly the same fields (plain
/// last-edit-wins covers those).
fn try_field_merge(
    local: &ScoreRecord,
    server: &ScoreRecord,
    base: &ScoreRecord,
) -> Option<Resolution> {
    let local_fields = local.modified_fields(base);
    let server_fields = server.modified_fields(base);
    if local_fields.is_empty() || server_fields.is_empty() {
        return None;
    }

    let local_unique: Vec<_> = local_fields
        .iter()
        .copied()
        .filter(|f| !server_fields.contains(f))
        .collect();
    let server_unique: Vec<_> = server_fields
        .iter()
        .copied()
        .filter(|f| !local_fields.contains(f))
        .collect();
    if local_unique.is_empty() && server_unique.is_empty() {
        return None;
    }

    // Start from the newer side so overlapping fields and the edit
    // timestamp already carry the last-edit-wins values, then graft on the
    // older side's unique changes.
    let newer = newer_side(local, server);
    let (mut merged, winning_side, graft_from, graft_fields) = match newer {
        Winner::Local => (local.clone(), Winner::Local, server, server_unique),
        Winner::Server => (server.clone(), Winner::Server, local, local_unique),
    };
    for field in graft_fields {
        merged.copy_field_from(graft_from, field);
    }

    Some(Resolution {
        winner: merged,
        winning_side,
        reason: ResolutionReason::FieldMerge,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{standard_holes, SyncStatus, TournamentFormat};
    use chrono::{TimeZone, Utc};

    fn tournament() -> Tournament {
        Tournament {
            tournament_id: 1,
            name: "Club Championship".to_string(),
            course_name: "Pine Hollow".to_string(),
            format: TournamentFormat::Gross,
            rounds: 2,
            holes: standard_holes(),
            max_strokes_per_hole: 10,
        }
    }

    fn record(device: &str, strokes: i32, minute: u32) -> ScoreRecord {
        ScoreRecord {
            tournament_id: 1,
            player_id: 7,
            round: 1,
            hole: 4,
            strokes,
            putts: None,
            penalty_strokes: None,
            fairway_hit: None,
            green_in_regulation: None,
            sand_save: None,
            up_and_down: None,
            recorded_by: device.to_string(),
            is_official: false,
            client_timestamp: Utc.with_ymd_and_hms(2025, 6, 14, 10, minute, 0).unwrap(),
            server_updated_at: Utc.with_ymd_and_hms(2025, 6, 14, 10, minute, 0).unwrap(),
            device_id: device.to_string(),
            sync_status: SyncStatus::Synced,
        }
    }

    #[test]
    fn newer_local_wins() {
        let t = tournament();
        let local = record("phone-a", 5, 30);
        let server = record("phone-b", 4, 10);
        let res = resolve(&local, &server, None, &t).unwrap();
        assert_eq!(res.winning_side, Winner::Local);
        assert_eq!(res.reason, ResolutionReason::LocalNewer);
        assert_eq!(res.winner.strokes, 5);
    }

    #[test]
    fn newer_server_wins() {
        let t = tournament();
        let local = record("phone-a", 5, 10);
        let server = record("phone-b", 4, 30);
        let res = resolve(&local, &server, None, &t).unwrap();
        assert_eq!(res.winning_side, Winner::Server);
        assert_eq!(res.reason, ResolutionReason::ServerNewer);
    }

    #[test]
    fn official_beats_newer_timestamp() {
        let t = tournament();
        let mut local = record("official-tablet", 5, 10);
        local.is_official = true;
        let server = record("phone-b", 4, 30);
        let res = resolve(&local, &server, None, &t).unwrap();
        assert_eq!(res.winning_side, Winner::Local);
        assert_eq!(res.reason, ResolutionReason::OfficialOverride);
    }

    #[test]
    fn invalid_side_loses_even_if_newer() {
        let t = tournament();
        let local = record("phone-a", 14, 30); // over the 10-stroke ceiling
        let server = record("phone-b", 4, 10);
        let res = resolve(&local, &server, None, &t).unwrap();
        assert_eq!(res.winning_side, Winner::Server);
        assert_eq!(res.reason, ResolutionReason::ValidationOverride);
    }

    #[test]
    fn both_invalid_is_an_error() {
        let t = tournament();
        let local = record("phone-a", 14, 30);
        let server = record("phone-b", 19, 10);
        let err = resolve(&local, &server, None, &t).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn equal_timestamps_break_on_device_id() {
        let t = tournament();
        let local = record("phone-b", 5, 20);
        let server = record("phone-a", 4, 20);
        let res = resolve(&local, &server, None, &t).unwrap();
        assert_eq!(res.winning_side, Winner::Local);

        // swap the sides: same winner by device, reproducible either way
        let res2 = resolve(&server, &local, None, &t).unwrap();
        assert_eq!(res2.winning_side, Winner::Server);
        assert_eq!(res2.winner.device_id, "phone-b");
    }

    #[test]
    fn resolution_is_deterministic() {
        let t = tournament();
        let local = record("phone-a", 5, 30);
        let server = record("phone-b", 4, 10);
        let first = resolve(&local, &server, None, &t).unwrap();
        for _ in 0..5 {
            let again = resolve(&local, &server, None, &t).unwrap();
            assert_eq!(again.reason, first.reason);
            assert_eq!(again.winner, first.winner);
        }
    }

    #[test]
    fn disjoint_edits_merge_field_by_field() {
        let t = tournament();
        let base = record("phone-a", 5, 10);

        // local fixed the putt count, server corrected the strokes
        let mut local = base.clone();
        local.putts = Some(2);
        local.client_timestamp = Utc.with_ymd_and_hms(2025, 6, 14, 10, 20, 0).unwrap();
        let mut server = base.clone();
        server.strokes = 6;
        server.client_timestamp = Utc.with_ymd_and_hms(2025, 6, 14, 10, 25, 0).unwrap();

        let res = resolve(&local, &server, Some(&base), &t).unwrap();
        assert_eq!(res.reason, ResolutionReason::FieldMerge);
        assert_eq!(res.winner.strokes, 6);
        assert_eq!(res.winner.putts, Some(2));
        // merged record carries the newer edit timestamp
        assert_eq!(res.winner.client_timestamp, server.client_timestamp);
    }

    #[test]
    fn overlapping_fields_take_the_newer_value() {
        let t = tournament();
        let base = record("phone-a", 5, 10);

        // both touched strokes; local alone touched putts
        let mut local = base.clone();
        local.strokes = 4;
        local.putts = Some(1);
        local.client_timestamp = Utc.with_ymd_and_hms(2025, 6, 14, 10, 20, 0).unwrap();
        let mut server = base.clone();
        server.strokes = 6;
        server.client_timestamp = Utc.with_ymd_and_hms(2025, 6, 14, 10, 25, 0).unwrap();

        let res = resolve(&local, &server, Some(&base), &t).unwrap();
        assert_eq!(res.reason, ResolutionReason::FieldMerge);
        assert_eq!(res.winner.strokes, 6); // server is newer on the overlap
        assert_eq!(res.winner.putts, Some(1)); // local's unique edit survives
    }

    #[test]
    fn identical_field_sets_fall_back_to_last_edit_wins() {
        let t = tournament();
        let base = record("phone-a", 5, 10);
        let mut local = base.clone();
        local.strokes = 4;
        local.client_timestamp = Utc.with_ymd_and_hms(2025, 6, 14, 10, 30, 0).unwrap();
        let mut server = base.clone();
        server.strokes = 6;
        server.client_timestamp = Utc.with_ymd_and_hms(2025, 6, 14, 10, 20, 0).unwrap();

        let res = resolve(&local, &server, Some(&base), &t).unwrap();
        assert_eq!(res.reason, ResolutionReason::LocalNewer);
        assert_eq!(res.winner.strokes, 4);
    }
}
