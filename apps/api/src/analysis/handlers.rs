use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{get_or_compute, run_analysis};
use crate::context::aggregator::FinancialContext;
use crate::context::prompts::ADVISOR_SYSTEM;
use crate::errors::AppError;
use crate::insights::Opportunity;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AnalysisQuery {
    pub user_id: Uuid,
    /// Bypass the cache and recompute.
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub context: FinancialContext,
    pub opportunities: Vec<Opportunity>,
    /// Prompt pair for the external LLM-call builder.
    pub advisor_system: &'static str,
    pub advisor_prompt: String,
    pub generated_at: DateTime<Utc>,
    pub cached: bool,
}

/// GET /api/v1/analysis
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Query(params): Query<AnalysisQuery>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let outcome = get_or_compute(
        state.cache.as_ref(),
        state.source.as_ref(),
        params.user_id,
        params.refresh,
    )
    .await;

    Ok(Json(AnalysisResponse {
        context: outcome.entry.analysis.context,
        opportunities: outcome.entry.analysis.opportunities,
        advisor_system: ADVISOR_SYSTEM,
        advisor_prompt: outcome.entry.analysis.advisor_prompt,
        generated_at: outcome.entry.generated_at,
        cached: outcome.cached,
    }))
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/opportunities
/// Always evaluated over a fresh context; the dashboard polls this rarely.
pub async fn handle_get_opportunities(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<Opportunity>>, AppError> {
    let analysis = run_analysis(state.source.as_ref(), params.user_id).await;
    Ok(Json(analysis.opportunities))
}
