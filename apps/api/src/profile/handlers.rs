//! Ordinary profile/portfolio CRUD. Thin by design; the only engine-facing
//! obligation here is invalidating the analysis cache after every write.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::portfolio::PortfolioPositionRow;
use crate::models::profile::FinancialProfileRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub user_id: Uuid,
    pub annual_income: Option<f64>,
    pub filing_status: Option<String>,
    pub state: Option<String>,
    pub primary_goal: Option<String>,
}

/// PATCH /api/v1/profile
pub async fn handle_upsert_profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<FinancialProfileRow>, AppError> {
    let row = sqlx::query_as::<_, FinancialProfileRow>(
        r#"
        INSERT INTO financial_profiles
            (id, user_id, annual_income, filing_status, state, primary_goal,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, now(), now())
        ON CONFLICT (user_id) DO UPDATE SET
            annual_income = COALESCE(EXCLUDED.annual_income, financial_profiles.annual_income),
            filing_status = COALESCE(EXCLUDED.filing_status, financial_profiles.filing_status),
            state = COALESCE(EXCLUDED.state, financial_profiles.state),
            primary_goal = COALESCE(EXCLUDED.primary_goal, financial_profiles.primary_goal),
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.user_id)
    .bind(req.annual_income)
    .bind(&req.filing_status)
    .bind(&req.state)
    .bind(&req.primary_goal)
    .fetch_one(&state.db)
    .await?;

    invalidate_analysis(&state, req.user_id).await;
    Ok(Json(row))
}

#[derive(Debug, Deserialize)]
pub struct AddPositionRequest {
    pub user_id: Uuid,
    pub symbol: String,
    pub shares: f64,
    pub cost_basis: f64,
    pub current_value: f64,
}

/// POST /api/v1/portfolio/positions
pub async fn handle_add_position(
    State(state): State<AppState>,
    Json(req): Json<AddPositionRequest>,
) -> Result<Json<PortfolioPositionRow>, AppError> {
    if req.symbol.trim().is_empty() {
        return Err(AppError::Validation("symbol must not be empty".to_string()));
    }

    let unrealized_gain = req.current_value - req.cost_basis;
    let unrealized_gain_percent = if req.cost_basis > 0.0 {
        Some(unrealized_gain / req.cost_basis * 100.0)
    } else {
        None
    };

    let row = sqlx::query_as::<_, PortfolioPositionRow>(
        r#"
        INSERT INTO portfolio_positions
            (id, user_id, symbol, shares, cost_basis, current_value,
             unrealized_gain, unrealized_gain_percent, added_at, price_updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), NULL)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.user_id)
    .bind(req.symbol.trim().to_uppercase())
    .bind(req.shares)
    .bind(req.cost_basis)
    .bind(req.current_value)
    .bind(unrealized_gain)
    .bind(unrealized_gain_percent)
    .fetch_one(&state.db)
    .await?;

    invalidate_analysis(&state, req.user_id).await;
    Ok(Json(row))
}

async fn invalidate_analysis(state: &AppState, user_id: Uuid) {
    if let Err(e) = state.cache.invalidate(user_id).await {
        warn!("cache invalidation failed for {user_id}: {e:#}");
    }
}
