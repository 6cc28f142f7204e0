use std::collections::HashMap;
use std::sync::Arc;

use actix_files::Files;
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use fairway_sync::args;
use fairway_sync::cache::LeaderboardCache;
use fairway_sync::controller::limit::RateLimiter;
use fairway_sync::controller::{leaderboard::leaderboard, seed, sync::sync_scores};
use fairway_sync::model::{ClaimsResolver, SeededClaims};
use fairway_sync::storage::{Storage, memory::MemoryStorage};
use fairway_sync::view;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = args::args_checks();

    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let claims: Arc<dyn ClaimsResolver> = match &args.seed_json {
        Some(json) => Arc::new(seed::seed_from_json(json, storage.as_ref()).await?),
        None => Arc::new(SeededClaims::new()),
    };
    let cache = Arc::new(LeaderboardCache::new(args.cache_ttl_seconds));
    let limiter = Arc::new(RateLimiter::new(
        args.rate_limit_window_seconds,
        args.rate_limit_max_requests,
    ));

    // a push transport would subscribe the same way
    let mut changes = cache.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = changes.recv().await {
            debug!(
                tournament_id = event.tournament_id,
                round = ?event.round,
                "leaderboard changed"
            );
        }
    });

    info!(host = %args.bind, port = args.port, "starting fairway-sync");
    let bind = (args.bind.clone(), args.port);
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(storage.clone()))
            .app_data(Data::new(cache.clone()))
            .app_data(Data::new(claims.clone()))
            .app_data(Data::new(limiter.clone()))
            .route("/", web::get().to(index))
            .route("/sync", web::post().to(sync_scores))
            .route("/leaderboard/{tournament_id}", web::get().to(leaderboard))
            .route("/health", web::get().to(HttpResponse::Ok))
            .service(Files::new("/static", "./static").show_files_listing())
    })
    .bind(bind)?
    .run()
    .await?;
    Ok(())
}

async fn index(
    query: web::Query<HashMap<String, String>>,
    storage: Data<Arc<dyn Storage>>,
) -> impl Responder {
    let tournament_str = query.get("tournament").map(String::as_str).unwrap_or("");
    let title =
        view::index::resolve_index_title_or_default(storage.as_ref().as_ref(), tournament_str)
            .await;
    let markup = view::index::render_index_template(&title);
    HttpResponse::Ok()
        .content_type("text/html")
        .body(markup.into_string())
}
