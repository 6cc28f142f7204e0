use ahash::AHashMap;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::error::AppError;

/// Fixed-window request counter per device. Cheap enough to sit in front of
/// every sync call; a fleet-wide limiter would live at the edge instead.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    counters: Mutex<AHashMap<String, (DateTime<Utc>, u32)>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(window_seconds: i64, max_requests: u32) -> Self {
        Self {
            window: Duration::seconds(window_seconds),
            max_requests,
            counters: Mutex::new(AHashMap::new()),
        }
    }

    /// Count one request against the device's window.
    ///
    /// # Errors
    ///
    /// Will return `Err(AppError::RateLimited)` with the seconds left in
    /// the window once the ceiling is passed.
    pub async fn check(&self, device_id: &str) -> Result<(), AppError> {
        let now = Utc::now();
        let mut counters = self.counters.lock().await;
        let entry = counters
            .entry(device_id.to_string())
            .or_insert((now, 0));
        if now - entry.0 >= self.window {
            *entry = (now, 0);
        }
        entry.1 += 1;
        if entry.1 > self.max_requests {
            let retry_after_seconds = (entry.0 + self.window - now).num_seconds().max(1) as u64;
            return Err(AppError::RateLimited {
                retry_after_seconds,
            });
        }
        Ok(())
    }
}
