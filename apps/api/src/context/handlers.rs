use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::context::aggregator::{build_context, FinancialContext};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/context
///
/// Infallible by design: sub-fetch failures degrade sections, and an empty
/// account yields the instructional fallback summary.
pub async fn handle_get_context(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<FinancialContext>, AppError> {
    let context = build_context(state.source.as_ref(), params.user_id).await;
    Ok(Json(context))
}
