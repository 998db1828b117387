#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One portfolio holding. Created on user add; `current_value` and the
/// unrealized gain columns are mutated only by the external price refresh job.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PortfolioPositionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub shares: f64,
    pub cost_basis: f64,
    pub current_value: f64,
    pub unrealized_gain: f64,
    pub unrealized_gain_percent: Option<f64>,
    pub added_at: DateTime<Utc>,
    pub price_updated_at: Option<DateTime<Utc>>,
}
