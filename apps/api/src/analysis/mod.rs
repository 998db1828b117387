//! Analysis pipeline: aggregate context, detect opportunities, prepare the
//! advisor prompt, and memoize the result per user.

pub mod brackets;
pub mod estimator;
pub mod handlers;
pub mod metrics;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{CacheStore, CachedAnalysis};
use crate::context::aggregator::{aggregate_context, FinancialContext};
use crate::context::prompts::build_advisor_prompt;
use crate::context::source::FinancialDataSource;
use crate::insights::{detect_opportunities, Opportunity};

/// The derived output bundle handed to the dashboard and the external
/// LLM-call builder. Recomputed fresh unless a cached copy is still valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub context: FinancialContext,
    pub opportunities: Vec<Opportunity>,
    /// Prepared prompt text; the model call happens outside this service.
    pub advisor_prompt: String,
}

pub struct AnalysisOutcome {
    pub entry: CachedAnalysis,
    pub cached: bool,
}

pub async fn run_analysis(source: &dyn FinancialDataSource, user_id: Uuid) -> AnalysisResult {
    let bundle = aggregate_context(source, user_id).await;
    let opportunities = detect_opportunities(&bundle.context);
    let advisor_prompt = build_advisor_prompt(&bundle.context.summary, &bundle.documents);
    AnalysisResult {
        context: bundle.context,
        opportunities,
        advisor_prompt,
    }
}

/// Returns the cached analysis while it is fresh, otherwise recomputes and
/// unconditionally overwrites the slot. Cache failures degrade to a miss;
/// they never fail the request.
pub async fn get_or_compute(
    cache: &dyn CacheStore,
    source: &dyn FinancialDataSource,
    user_id: Uuid,
    force_refresh: bool,
) -> AnalysisOutcome {
    if !force_refresh {
        match cache.get(user_id).await {
            Ok(Some(entry)) if entry.is_fresh(Utc::now()) => {
                return AnalysisOutcome {
                    entry,
                    cached: true,
                }
            }
            Ok(_) => {}
            Err(e) => warn!("cache read failed for {user_id}, treating as miss: {e:#}"),
        }
    }

    info!("Computing fresh analysis for user {user_id}");
    let analysis = run_analysis(source, user_id).await;
    let entry = CachedAnalysis {
        analysis,
        generated_at: Utc::now(),
    };
    if let Err(e) = cache.set(user_id, entry.clone()).await {
        warn!("cache write failed for {user_id}: {e:#}");
    }

    AnalysisOutcome {
        entry,
        cached: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::InMemoryCacheStore;
    use crate::models::document::{DocumentRow, TaxReturnRow};
    use crate::models::portfolio::PortfolioPositionRow;
    use crate::models::profile::{FinancialProfileRow, LiquidityProfileRow};
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::Duration;

    struct EmptySource;

    #[async_trait]
    impl FinancialDataSource for EmptySource {
        async fn get_profile(&self, _u: Uuid) -> Result<Option<FinancialProfileRow>> {
            Ok(None)
        }
        async fn get_tax_returns(&self, _u: Uuid) -> Result<Vec<TaxReturnRow>> {
            Ok(vec![])
        }
        async fn get_positions(&self, _u: Uuid) -> Result<Vec<PortfolioPositionRow>> {
            Ok(vec![])
        }
        async fn get_documents(&self, _u: Uuid) -> Result<Vec<DocumentRow>> {
            Ok(vec![])
        }
        async fn get_liquidity_profile(&self, _u: Uuid) -> Result<Option<LiquidityProfileRow>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_read_within_ttl_is_cached() {
        let cache = InMemoryCacheStore::new();
        let user = Uuid::new_v4();

        let first = get_or_compute(&cache, &EmptySource, user, false).await;
        assert!(!first.cached);

        let second = get_or_compute(&cache, &EmptySource, user, false).await;
        assert!(second.cached);
        assert_eq!(second.entry.generated_at, first.entry.generated_at);
    }

    #[tokio::test]
    async fn test_stale_entry_is_recomputed() {
        let cache = InMemoryCacheStore::new();
        let user = Uuid::new_v4();

        let mut outcome = get_or_compute(&cache, &EmptySource, user, false).await;
        outcome.entry.generated_at = Utc::now() - Duration::hours(25);
        cache.set(user, outcome.entry.clone()).await.unwrap();

        let refreshed = get_or_compute(&cache, &EmptySource, user, false).await;
        assert!(!refreshed.cached);
        assert!(refreshed.entry.generated_at > outcome.entry.generated_at);
    }

    #[tokio::test]
    async fn test_force_refresh_skips_fresh_cache() {
        let cache = InMemoryCacheStore::new();
        let user = Uuid::new_v4();

        get_or_compute(&cache, &EmptySource, user, false).await;
        let forced = get_or_compute(&cache, &EmptySource, user, true).await;
        assert!(!forced.cached);
    }

    #[tokio::test]
    async fn test_analysis_carries_prompt_and_context() {
        let outcome = get_or_compute(
            &InMemoryCacheStore::new(),
            &EmptySource,
            Uuid::new_v4(),
            false,
        )
        .await;
        let analysis = &outcome.entry.analysis;
        assert!(!analysis.context.has_data);
        assert!(analysis.opportunities.is_empty());
        assert!(analysis
            .advisor_prompt
            .contains(&analysis.context.summary));
    }
}
