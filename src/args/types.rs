use clap::Parser;
use serde_json::Value;

use crate::cache::DEFAULT_CACHE_TTL_SECONDS;

#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to bind the HTTP server to.
    #[arg(long, value_name = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind: String,
    #[arg(short = 'p', long, value_name = "PORT", default_value = "8081")]
    pub port: u16,
    /// Seed document with tournaments, players and official devices,
    /// loaded on startup.
    #[arg(
        long,
        value_name = "SEED_JSON",
        value_parser = crate::args::validation::check_readable_file_and_json
    )]
    pub seed_json: Option<Value>,
    /// How long a computed leaderboard may be served before recomputing.
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_CACHE_TTL_SECONDS)]
    pub cache_ttl_seconds: i64,
    #[arg(long, value_name = "SECONDS", default_value = "60")]
    pub rate_limit_window_seconds: i64,
    #[arg(long, value_name = "COUNT", default_value = "120")]
    pub rate_limit_max_requests: u32,
}
