//! Analysis Cache: one slot per user memoizing the expensive aggregate
//! analysis. Backends are pluggable behind `CacheStore` so the default
//! in-memory map can be swapped for a distributed cache without touching
//! call sites.

pub mod memory;
pub mod redis;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::AnalysisResult;

/// Cached analyses older than this are recomputed on read.
pub const ANALYSIS_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub analysis: AnalysisResult,
    pub generated_at: DateTime<Utc>,
}

impl CachedAnalysis {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.generated_at < Duration::hours(ANALYSIS_TTL_HOURS)
    }
}

/// Carried in `AppState` as `Arc<dyn CacheStore>`.
///
/// `set` replaces the whole slot in one operation; concurrent refreshes for
/// the same user must never produce a torn multi-field read.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<CachedAnalysis>>;

    async fn set(&self, user_id: Uuid, entry: CachedAnalysis) -> Result<()>;

    /// Clears a user's slot. Called whenever that user's underlying
    /// profile, tax, portfolio, or document data changes.
    async fn invalidate(&self, user_id: Uuid) -> Result<()>;
}

/// Minimal entry used by backend tests.
#[cfg(test)]
pub(crate) fn sample_entry(generated_at: DateTime<Utc>) -> CachedAnalysis {
    use crate::context::aggregator::{ContextDetails, FinancialContext, IncomeSnapshot, IncomeSource};

    CachedAnalysis {
        analysis: AnalysisResult {
            context: FinancialContext {
                summary: "s".to_string(),
                has_data: false,
                document_count: 0,
                income: IncomeSnapshot {
                    annual_income: None,
                    marginal_bracket: None,
                    effective_tax_rate: None,
                    source: IncomeSource::Unknown,
                    is_estimated: false,
                },
                details: ContextDetails {
                    profile: None,
                    tax_returns: vec![],
                    portfolio: vec![],
                    documents: vec![],
                    liquidity: None,
                },
            },
            opportunities: vec![],
            advisor_prompt: String::new(),
        },
        generated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_within_24h() {
        let now = Utc::now();
        let entry = sample_entry(now - Duration::hours(23));
        assert!(entry.is_fresh(now));
    }

    #[test]
    fn test_stale_at_24h() {
        let now = Utc::now();
        let entry = sample_entry(now - Duration::hours(24));
        assert!(!entry.is_fresh(now));
    }
}
