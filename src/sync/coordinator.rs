use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::InvalidationHook;
use crate::error::AppError;
use crate::model::{
    Claims, ResolutionAudit, ScoreEdit, ScoreRecord, SyncItemResult, SyncOutcome, SyncRequest,
    SyncResponse, SyncStatus,
};
use crate::storage::{CasOutcome, Storage};
use crate::sync::resolver::{self, ResolutionReason, Winner};

/// Process one batch of client edits. Every input item gets exactly one
/// result; one item's failure never touches the others. Structurally
/// malformed batches (no scores at all) are the only whole-batch rejection.
///
/// # Errors
///
/// Will return `Err` only for an empty score list.
pub async fn sync_batch(
    request: &SyncRequest,
    claims: &Claims,
    storage: &dyn Storage,
    hook: &dyn InvalidationHook,
) -> Result<SyncResponse, AppError> {
    if request.scores.is_empty() {
        return Err(AppError::Validation(
            "sync request contains no scores".to_string(),
        ));
    }

    let mut results = Vec::with_capacity(request.scores.len());
    for edit in &request.scores {
        let id = edit.result_id();
        let result = match apply_edit(edit, &request.device_id, claims, storage).await {
            Ok(applied) => {
                if applied.state_changed {
                    hook.leaderboard_changed(edit.tournament_id, Some(edit.round))
                        .await;
                }
                SyncItemResult::new(id, applied.status, applied.server_data)
            }
            Err(e) => SyncItemResult::error(id, e.to_string()),
        };
        results.push(result);
    }

    info!(
        device = %request.device_id,
        items = results.len(),
        "sync batch complete"
    );
    Ok(SyncResponse {
        results,
        server_timestamp: Utc::now(),
    })
}

struct AppliedEdit {
    status: SyncOutcome,
    server_data: Option<ScoreRecord>,
    state_changed: bool,
}

impl AppliedEdit {
    fn no_change(status: SyncOutcome, server_data: Option<ScoreRecord>) -> Self {
        Self {
            status,
            server_data,
            state_changed: false,
        }
    }

    fn changed(status: SyncOutcome, server_data: Option<ScoreRecord>) -> Self {
        Self {
            status,
            server_data,
            state_changed: true,
        }
    }
}

/// One edit, one isolated unit of work: look up by natural identity, insert
/// or resolve, write behind compare-and-swap. A lost race re-resolves
/// against fresh server state once before giving up.
async fn apply_edit(
    edit: &ScoreEdit,
    device_id: &str,
    claims: &Claims,
    storage: &dyn Storage,
) -> Result<AppliedEdit, AppError> {
    let tournament = storage.get_tournament(edit.tournament_id).await?;
    storage.get_player(edit.player_id).await?;
    let key = edit.key();

    for attempt in 0..2 {
        let now = Utc::now();
        let candidate = edit.to_record(device_id, &claims.recorded_by, claims.is_official, now);

        let Some(server) = storage.get_score(key).await? else {
            candidate.validate(&tournament)?;
            match storage.insert_score(candidate).await {
                Ok(()) => return Ok(AppliedEdit::changed(SyncOutcome::Created, None)),
                Err(AppError::Conflict(_)) if attempt == 0 => {
                    debug!(%key, "insert raced with another writer, re-resolving");
                    continue;
                }
                Err(AppError::Conflict(msg)) => return Err(AppError::TransientStore(msg)),
                Err(e) => return Err(e),
            }
        };

        // identical resubmission of what the server already holds
        if server.content_matches(&candidate) {
            return Ok(AppliedEdit::no_change(SyncOutcome::Updated, None));
        }

        let ancestor = storage.get_prior_version(key).await?;
        let resolution = resolver::resolve(&candidate, &server, ancestor.as_ref(), &tournament)?;
        storage
            .record_resolution(audit_for(&resolution.winner, &candidate, &server, resolution.reason))
            .await?;

        let local_prevails = resolution.reason == ResolutionReason::FieldMerge
            || resolution.winning_side == Winner::Local;
        if !local_prevails {
            return Ok(AppliedEdit::no_change(
                SyncOutcome::Conflict,
                Some(server),
            ));
        }

        let mut winner = resolution.winner;
        winner.server_updated_at = now;
        winner.sync_status = SyncStatus::Synced;
        let merged = (resolution.reason == ResolutionReason::FieldMerge)
            .then(|| winner.clone());

        match storage
            .update_score_cas(winner, server.server_updated_at)
            .await?
        {
            CasOutcome::Applied => {
                return Ok(AppliedEdit::changed(SyncOutcome::Updated, merged));
            }
            CasOutcome::Stale if attempt == 0 => {
                warn!(%key, "compare-and-swap lost a race, re-resolving against fresh state");
                continue;
            }
            CasOutcome::Stale => {
                let fresh = storage.get_score(key).await?;
                return Ok(AppliedEdit::no_change(SyncOutcome::Conflict, fresh));
            }
        }
    }

    Err(AppError::TransientStore(format!(
        "score {key} still contested after retry"
    )))
}

fn audit_for(
    winner: &ScoreRecord,
    candidate: &ScoreRecord,
    server: &ScoreRecord,
    reason: ResolutionReason,
) -> ResolutionAudit {
    let losing_device = if winner.device_id == candidate.device_id {
        server.device_id.clone()
    } else {
        candidate.device_id.clone()
    };
    ResolutionAudit {
        tournament_id: candidate.tournament_id,
        player_id: candidate.player_id,
        round: candidate.round,
        hole: candidate.hole,
        reason,
        winning_device: winner.device_id.clone(),
        losing_device,
        resolved_at: Utc::now(),
    }
}
