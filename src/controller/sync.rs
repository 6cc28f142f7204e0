use std::sync::Arc;

use actix_web::web::{self, Data};
use actix_web::{HttpResponse, Responder};
use serde_json::json;

use crate::cache::LeaderboardCache;
use crate::controller::limit::RateLimiter;
use crate::error::AppError;
use crate::model::{ClaimsResolver, SyncRequest};
use crate::storage::Storage;
use crate::sync::coordinator;

pub async fn sync_scores(
    body: web::Json<SyncRequest>,
    storage: Data<Arc<dyn Storage>>,
    cache: Data<Arc<LeaderboardCache>>,
    claims: Data<Arc<dyn ClaimsResolver>>,
    limiter: Data<Arc<RateLimiter>>,
) -> impl Responder {
    let request = body.into_inner();

    if let Err(e) = limiter.check(&request.device_id).await {
        let retry_after_seconds = match e {
            AppError::RateLimited {
                retry_after_seconds,
            } => retry_after_seconds,
            _ => 1,
        };
        return HttpResponse::TooManyRequests().json(json!({
            "error": e.to_string(),
            "retry_after_seconds": retry_after_seconds,
        }));
    }

    let resolved = claims.resolve(&request.device_id).await;
    match coordinator::sync_batch(
        &request,
        &resolved,
        storage.as_ref().as_ref(),
        cache.as_ref().as_ref(),
    )
    .await
    {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(AppError::Validation(msg)) => {
            HttpResponse::BadRequest().json(json!({"error": msg}))
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": e.to_string()})),
    }
}
