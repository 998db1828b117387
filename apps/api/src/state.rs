use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::context::source::FinancialDataSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Read accessors for profile, tax returns, portfolio, documents, liquidity.
    pub source: Arc<dyn FinancialDataSource>,
    /// Pluggable analysis cache. Default: InMemoryCacheStore. Swap via CACHE_BACKEND env.
    pub cache: Arc<dyn CacheStore>,
    /// Kept for handlers that need deploy-time settings later.
    #[allow(dead_code)]
    pub config: Config,
}
