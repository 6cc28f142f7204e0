use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;

use actix_web::web::{self, Data};
use actix_web::{HttpResponse, Responder};
use serde_json::json;

use crate::cache::{LeaderboardCache, LeaderboardKey};
use crate::error::AppError;
use crate::model::{Leaderboard, TournamentFormat};
use crate::scoring;
use crate::storage::Storage;

#[derive(Debug, Clone)]
pub struct LeaderboardRequest {
    pub tournament_id: i64,
    pub format: Option<TournamentFormat>,
    pub flight: Option<String>,
    pub round: Option<i32>,
}

/// Parse query parameters into a leaderboard request for one tournament.
///
/// # Errors
///
/// Will return `Err` if a parameter does not parse.
pub fn parse_leaderboard_request<S: BuildHasher>(
    tournament_id: i64,
    query: &HashMap<String, String, S>,
) -> Result<LeaderboardRequest, AppError> {
    let format = query
        .get("format")
        .filter(|s| !s.trim().is_empty())
        .map(|s| TournamentFormat::parse(s))
        .transpose()?;
    let flight = query
        .get("flight")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let round = query
        .get("round")
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse()
                .map_err(|_| AppError::Parse(format!("round '{s}' is not a number")))
        })
        .transpose()?;
    Ok(LeaderboardRequest {
        tournament_id,
        format,
        flight,
        round,
    })
}

/// Serve a leaderboard view from cache, recomputing from current store
/// state on a miss.
///
/// # Errors
///
/// Will return `Err` if the tournament is unknown or the view cannot be
/// ranked.
pub async fn leaderboard_for(
    storage: &dyn Storage,
    cache: &LeaderboardCache,
    request: &LeaderboardRequest,
) -> Result<Leaderboard, AppError> {
    let tournament = storage.get_tournament(request.tournament_id).await?;
    let format = match request.format {
        Some(format) => format,
        // a match-play tournament still gets a stroke board by default
        None => match tournament.format {
            TournamentFormat::Match => TournamentFormat::Gross,
            format => format,
        },
    };

    let key = LeaderboardKey {
        tournament_id: request.tournament_id,
        format,
        flight: request.flight.clone(),
        round: request.round,
    };
    if let Some(board) = cache.get(&key).await {
        return Ok(board);
    }

    let players = storage
        .get_players_for_tournament(request.tournament_id)
        .await?;
    let scores = storage.get_scores(request.tournament_id, request.round).await?;
    let board = scoring::leaderboard::build(
        &players,
        &scores,
        &tournament,
        format,
        request.flight.as_deref(),
        request.round,
    )?;
    cache.put(key, board.clone()).await;
    Ok(board)
}

pub async fn leaderboard(
    path: web::Path<i64>,
    query: web::Query<HashMap<String, String>>,
    storage: Data<Arc<dyn Storage>>,
    cache: Data<Arc<LeaderboardCache>>,
) -> impl Responder {
    let request = match parse_leaderboard_request(path.into_inner(), &query) {
        Ok(request) => request,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": e.to_string()})),
    };

    match leaderboard_for(storage.as_ref().as_ref(), cache.as_ref().as_ref(), &request).await {
        Ok(board) => HttpResponse::Ok().json(board),
        Err(e @ AppError::NotFound(_)) => {
            HttpResponse::NotFound().json(json!({"error": e.to_string()}))
        }
        Err(e @ (AppError::Validation(_) | AppError::Parse(_))) => {
            HttpResponse::BadRequest().json(json!({"error": e.to_string()}))
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": e.to_string()})),
    }
}
