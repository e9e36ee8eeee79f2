use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub request_timeout_secs: u64,
    /// How long dashboard aggregates may be served from cache
    pub stats_cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Ok(Config {
            environment: env::var("ENVIRONMENT")
                .map_err(|_| anyhow::anyhow!("ENVIRONMENT environment variable is required"))?,
            port: env::var("PORT")
                .map_err(|_| anyhow::anyhow!("PORT environment variable is required"))?
                .parse()?,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            max_connections: env::var("MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()?,
            request_timeout_secs: env::var("REQUEST_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            stats_cache_ttl_secs: env::var("STATS_CACHE_TTL")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
        })
    }
}
