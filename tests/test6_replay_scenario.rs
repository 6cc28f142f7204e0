mod common;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use common::{batch, edit, player_claims, seeded_storage};
use fairway_sync::cache::LeaderboardCache;
use fairway_sync::controller::leaderboard::{LeaderboardRequest, leaderboard_for};
use fairway_sync::model::{ScoreEdit, ScoreRecord, SyncOutcome};
use fairway_sync::storage::Storage;
use fairway_sync::storage::memory::MemoryStorage;
use fairway_sync::sync::coordinator::sync_batch;
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DEVICES: [&str; 3] = ["course-ipad", "device-a", "device-b"];
const CHUNK: usize = 25;

fn generate_edits(rng: &mut StdRng) -> HashMap<&'static str, Vec<ScoreEdit>> {
    let mut by_device: HashMap<&'static str, Vec<ScoreEdit>> = HashMap::new();
    for _ in 0..500 {
        let device = DEVICES[rng.gen_range(0..DEVICES.len())];
        let player = rng.gen_range(1..=6);
        let round = rng.gen_range(1..=2);
        let hole = rng.gen_range(1..=18);
        let strokes = rng.gen_range(1..=9);
        let minute = rng.gen_range(0..240);
        by_device
            .entry(device)
            .or_default()
            .push(edit(player, round, hole, strokes, minute));
    }
    by_device
}

async fn snapshot(storage: &MemoryStorage) -> Vec<ScoreRecord> {
    let mut records = storage.get_scores(1, None).await.unwrap();
    records.sort_by_key(|r| r.key().to_string());
    records
}

fn assert_terminal(results: &[fairway_sync::model::SyncItemResult]) {
    for result in results {
        assert!(
            matches!(
                result.status,
                SyncOutcome::Created | SyncOutcome::Updated | SyncOutcome::Conflict
            ),
            "unexpected status {:?} for {} ({:?})",
            result.status,
            result.id,
            result.error_message
        );
    }
}

/// 500 offline edits across 3 devices, ~30% of responses lost mid-request
/// (the server applied the batch, the device never heard back), replayed on
/// reconnect. Everything must land exactly once with no silent loss.
#[tokio::test]
async fn test_offline_replay_converges() -> Result<(), Box<dyn std::error::Error>> {
    let storage = seeded_storage().await;
    let cache = Arc::new(LeaderboardCache::new(300));
    let mut rng = StdRng::seed_from_u64(1907);

    let mut by_device = generate_edits(&mut rng);
    let master = by_device.clone();
    let all_keys: HashSet<_> = by_device.values().flatten().map(ScoreEdit::key).collect();
    let total_edits: usize = by_device.values().map(Vec::len).sum();
    assert_eq!(total_edits, 500);

    // pass 1: the three devices sync their queues concurrently
    let mut handles = Vec::new();
    for device in DEVICES {
        let edits = by_device.remove(device).unwrap_or_default();
        let lost_flags: Vec<bool> = edits.chunks(CHUNK).map(|_| rng.gen_bool(0.3)).collect();
        let storage = storage.clone();
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            let mut produced = Vec::new();
            let mut replay: Vec<ScoreEdit> = Vec::new();
            for (chunk, lost) in edits.chunks(CHUNK).zip(lost_flags) {
                let request = batch(device, chunk.to_vec());
                let response = sync_batch(
                    &request,
                    &player_claims(device),
                    storage.as_ref(),
                    cache.as_ref(),
                )
                .await
                .unwrap();
                produced.extend(response.results);
                if lost {
                    replay.extend_from_slice(chunk);
                }
            }
            (device, produced, replay)
        }));
    }

    let mut replay_queues = Vec::new();
    let mut produced_total = 0;
    for outcome in join_all(handles).await {
        let (device, produced, replay) = outcome?;
        assert_terminal(&produced);
        produced_total += produced.len();
        if !replay.is_empty() {
            replay_queues.push((device, replay));
        }
    }
    // the server answered every single submitted item
    assert_eq!(produced_total, 500);

    // pass 2: reconnected devices replay the batches they never got
    // answers for; replay order within a device is preserved
    for (device, replay) in &replay_queues {
        for chunk in replay.chunks(CHUNK) {
            let request = batch(device, chunk.to_vec());
            let response = sync_batch(
                &request,
                &player_claims(device),
                storage.as_ref(),
                cache.as_ref(),
            )
            .await?;
            assert_terminal(&response.results);
        }
    }

    // zero silent loss, zero duplicate identities
    let records = snapshot(storage.as_ref()).await;
    let stored_keys: HashSet<_> = records.iter().map(ScoreRecord::key).collect();
    assert_eq!(stored_keys.len(), records.len());
    assert_eq!(stored_keys, all_keys);

    // passes 3 and 4: a full reconciliation sweep from every device reaches
    // a fixpoint; the second sweep must not move anything
    let mut settled: Vec<ScoreRecord> = Vec::new();
    for pass in 0..2 {
        for device in DEVICES {
            if let Some(edits) = master.get(device) {
                for chunk in edits.chunks(CHUNK) {
                    let request = batch(device, chunk.to_vec());
                    let response = sync_batch(
                        &request,
                        &player_claims(device),
                        storage.as_ref(),
                        cache.as_ref(),
                    )
                    .await?;
                    assert_terminal(&response.results);
                }
            }
        }
        let state = snapshot(storage.as_ref()).await;
        if pass == 1 {
            assert_eq!(settled, state, "replays after convergence must be no-ops");
        }
        settled = state;
    }

    // the leaderboard still ranks the whole field
    let board = leaderboard_for(
        storage.as_ref(),
        cache.as_ref(),
        &LeaderboardRequest {
            tournament_id: 1,
            format: None,
            flight: None,
            round: None,
        },
    )
    .await?;
    assert_eq!(board.leaderboard.len() + board.not_started.len(), 6);

    Ok(())
}
