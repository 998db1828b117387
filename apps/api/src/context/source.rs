//! Read accessors over the persistent store, behind a trait so the
//! aggregator can be exercised without a database and so each entity has an
//! explicit typed accessor instead of ad hoc queries at call sites.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::document::{DocumentRow, TaxReturnRow};
use crate::models::portfolio::PortfolioPositionRow;
use crate::models::profile::{FinancialProfileRow, LiquidityProfileRow};

/// Carried in `AppState` as `Arc<dyn FinancialDataSource>`.
#[async_trait]
pub trait FinancialDataSource: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<FinancialProfileRow>>;

    /// Newest first.
    async fn get_tax_returns(&self, user_id: Uuid) -> Result<Vec<TaxReturnRow>>;

    async fn get_positions(&self, user_id: Uuid) -> Result<Vec<PortfolioPositionRow>>;

    async fn get_documents(&self, user_id: Uuid) -> Result<Vec<DocumentRow>>;

    async fn get_liquidity_profile(&self, user_id: Uuid) -> Result<Option<LiquidityProfileRow>>;
}

pub struct PgDataSource {
    pool: PgPool,
}

impl PgDataSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FinancialDataSource for PgDataSource {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<FinancialProfileRow>> {
        let row = sqlx::query_as::<_, FinancialProfileRow>(
            "SELECT * FROM financial_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_tax_returns(&self, user_id: Uuid) -> Result<Vec<TaxReturnRow>> {
        let rows = sqlx::query_as::<_, TaxReturnRow>(
            "SELECT * FROM tax_returns WHERE user_id = $1 ORDER BY tax_year DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_positions(&self, user_id: Uuid) -> Result<Vec<PortfolioPositionRow>> {
        let rows = sqlx::query_as::<_, PortfolioPositionRow>(
            "SELECT * FROM portfolio_positions WHERE user_id = $1 ORDER BY current_value DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_documents(&self, user_id: Uuid) -> Result<Vec<DocumentRow>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT * FROM documents WHERE user_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_liquidity_profile(&self, user_id: Uuid) -> Result<Option<LiquidityProfileRow>> {
        let row = sqlx::query_as::<_, LiquidityProfileRow>(
            "SELECT * FROM liquidity_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
