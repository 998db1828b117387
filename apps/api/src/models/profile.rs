#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User-declared financial profile. Authoritative: when a declared value is
/// present it overrides anything derived from uploaded documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FinancialProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub annual_income: Option<f64>,
    pub filing_status: Option<String>,
    pub state: Option<String>,
    pub primary_goal: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LiquidityProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cash_on_hand: Option<f64>,
    pub monthly_expenses: Option<f64>,
    pub updated_at: DateTime<Utc>,
}
