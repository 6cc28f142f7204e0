use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::AppError;
use crate::model::{Player, SeededClaims, Tournament};
use crate::storage::Storage;

#[derive(Deserialize)]
struct SeedFile {
    #[serde(default)]
    tournaments: Vec<SeedTournament>,
    #[serde(default)]
    officials: Vec<SeedOfficial>,
}

#[derive(Deserialize)]
struct SeedTournament {
    #[serde(flatten)]
    tournament: Tournament,
    #[serde(default)]
    players: Vec<Player>,
}

#[derive(Deserialize)]
struct SeedOfficial {
    device_id: String,
    name: String,
}

/// Load tournaments, players and the official-device roster from a seed
/// document into the store at startup.
///
/// # Errors
///
/// Will return `Err` if the document does not match the seed shape or a
/// store write fails.
pub async fn seed_from_json(
    json: &Value,
    storage: &dyn Storage,
) -> Result<SeededClaims, AppError> {
    let seed: SeedFile = serde_json::from_value(json.clone())?;

    for entry in &seed.tournaments {
        storage.put_tournament(entry.tournament.clone()).await?;
        for player in &entry.players {
            storage
                .put_player(entry.tournament.tournament_id, player.clone())
                .await?;
        }
        info!(
            tournament = %entry.tournament.name,
            players = entry.players.len(),
            "seeded tournament"
        );
    }

    let mut claims = SeededClaims::new();
    for official in seed.officials {
        claims.add_official(official.device_id, official.name);
    }
    Ok(claims)
}
