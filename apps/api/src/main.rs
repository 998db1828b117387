mod analysis;
mod cache;
mod config;
mod context;
mod db;
mod errors;
mod extraction;
mod insights;
mod models;
mod profile;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::memory::InMemoryCacheStore;
use crate::cache::redis::RedisCacheStore;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::context::source::PgDataSource;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Finsight API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Select the analysis cache backend
    let cache: Arc<dyn CacheStore> = match config.cache_backend.as_str() {
        "redis" => {
            let url = config
                .redis_url
                .as_deref()
                .expect("validated by Config::from_env");
            info!("Analysis cache backend: redis");
            Arc::new(RedisCacheStore::new(url)?)
        }
        _ => {
            info!("Analysis cache backend: in-memory");
            Arc::new(InMemoryCacheStore::new())
        }
    };

    // Build app state
    let state = AppState {
        source: Arc::new(PgDataSource::new(db.clone())),
        db,
        cache,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
