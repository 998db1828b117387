use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails with context if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Required only when `cache_backend` is "redis".
    pub redis_url: Option<String>,
    /// "memory" (default) or "redis".
    pub cache_backend: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let cache_backend =
            std::env::var("CACHE_BACKEND").unwrap_or_else(|_| "memory".to_string());
        let redis_url = std::env::var("REDIS_URL").ok();

        if cache_backend == "redis" && redis_url.is_none() {
            anyhow::bail!("CACHE_BACKEND=redis requires REDIS_URL to be set");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url,
            cache_backend,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
