use thiserror::Error;

/// Application error taxonomy. Variants correspond to the failure modes the
/// controllers, storage seam and scoring engine surface; handlers map each to
/// an HTTP status and JSON body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transient store error: {0}")]
    TransientStore(String),

    #[error("rate limited; retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}
