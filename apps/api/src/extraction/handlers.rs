use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::tax_return::TaxReturnFacts;
use crate::extraction::{extract, DocumentKind, FactSet};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub user_id: Uuid,
    pub raw_text: String,
    pub document_kind: String,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExtractPreviewResponse {
    pub facts: FactSet,
}

#[derive(Debug, Serialize)]
pub struct ExtractConfirmResponse {
    pub document_id: Uuid,
    /// Present when the confirmed facts were a tax return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_return_id: Option<Uuid>,
}

fn parse_request(req: &ExtractRequest) -> Result<DocumentKind, AppError> {
    if req.raw_text.trim().is_empty() {
        return Err(AppError::Validation("raw_text must not be empty".to_string()));
    }
    req.document_kind.parse()
}

/// POST /api/v1/documents/extract
/// Extraction preview: nothing is persisted.
pub async fn handle_extract(
    State(_state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ExtractPreviewResponse>, AppError> {
    let kind = parse_request(&req)?;
    let facts = extract(&req.raw_text, kind);
    Ok(Json(ExtractPreviewResponse { facts }))
}

/// POST /api/v1/documents/extract/confirm
///
/// Re-runs the (deterministic) extraction server-side, persists the document
/// with its fact set, mirrors tax-return facts into their own table, and
/// invalidates the user's analysis cache slot.
pub async fn handle_extract_confirm(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ExtractConfirmResponse>, AppError> {
    let kind = parse_request(&req)?;
    let facts = extract(&req.raw_text, kind);

    let document_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO documents
            (id, user_id, document_kind, tax_year, filename, status,
             extracted_text, extracted_data, uploaded_at)
        VALUES ($1, $2, $3, $4, $5, 'completed', $6, $7, now())
        "#,
    )
    .bind(document_id)
    .bind(req.user_id)
    .bind(kind.as_str())
    .bind(facts.tax_year())
    .bind(&req.filename)
    .bind(&req.raw_text)
    .bind(serde_json::to_value(&facts).map_err(|e| AppError::Internal(e.into()))?)
    .execute(&state.db)
    .await?;

    let tax_return_id = match &facts {
        FactSet::TaxReturn(tr) => Some(insert_tax_return(&state, req.user_id, tr).await?),
        _ => None,
    };

    info!(
        "Confirmed {} document {document_id} for user {}",
        kind, req.user_id
    );

    // Underlying data changed; the memoized analysis is no longer valid.
    if let Err(e) = state.cache.invalidate(req.user_id).await {
        warn!("cache invalidation failed for {}: {e:#}", req.user_id);
    }

    Ok(Json(ExtractConfirmResponse {
        document_id,
        tax_return_id,
    }))
}

async fn insert_tax_return(
    state: &AppState,
    user_id: Uuid,
    facts: &TaxReturnFacts,
) -> Result<Uuid, AppError> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO tax_returns
            (id, user_id, tax_year, filing_status, wages, taxable_interest,
             ordinary_dividends, capital_gains, business_income, total_income,
             adjusted_gross_income, itemized_deductions, standard_deduction,
             taxable_income, total_federal_tax, state_tax_paid, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, now())
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(facts.tax_year)
    .bind(&facts.filing_status)
    .bind(facts.wages)
    .bind(facts.taxable_interest)
    .bind(facts.ordinary_dividends)
    .bind(facts.capital_gains)
    .bind(facts.business_income)
    .bind(facts.total_income)
    .bind(facts.adjusted_gross_income)
    .bind(facts.itemized_deductions)
    .bind(facts.standard_deduction)
    .bind(facts.taxable_income)
    .bind(facts.total_federal_tax)
    .bind(facts.state_tax_paid)
    .execute(&state.db)
    .await?;
    Ok(id)
}
