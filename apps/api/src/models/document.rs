#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::extraction::tax_return::TaxReturnFacts;
use crate::extraction::FactSet;

/// An uploaded document after external PDF-to-text conversion.
/// Immutable once status reaches "completed"; `extracted_data` holds the
/// FactSet produced by the field extractor.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_kind: String,
    pub tax_year: Option<i32>,
    pub filename: Option<String>,
    /// "pending" | "completed" | "failed"
    pub status: String,
    pub extracted_text: Option<String>,
    pub extracted_data: Option<Value>,
    pub uploaded_at: DateTime<Utc>,
}

impl DocumentRow {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }

    /// Deserializes the stored FactSet, if any. A row whose payload does not
    /// parse is treated the same as a row with no extraction.
    pub fn fact_set(&self) -> Option<FactSet> {
        self.extracted_data
            .clone()
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

/// A confirmed tax return, persisted from a tax-return FactSet.
/// Fetched newest-first; the latest row drives derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaxReturnRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tax_year: i32,
    pub filing_status: Option<String>,
    pub wages: Option<f64>,
    pub taxable_interest: Option<f64>,
    pub ordinary_dividends: Option<f64>,
    pub capital_gains: Option<f64>,
    pub business_income: Option<f64>,
    pub total_income: Option<f64>,
    pub adjusted_gross_income: Option<f64>,
    pub itemized_deductions: Option<f64>,
    pub standard_deduction: Option<f64>,
    pub taxable_income: Option<f64>,
    pub total_federal_tax: Option<f64>,
    pub state_tax_paid: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl TaxReturnRow {
    /// Rebuilds a fact view over the stored columns so the derived metrics
    /// calculator has a single input type. Provenance lives on the original
    /// document row, not here.
    pub fn facts(&self) -> TaxReturnFacts {
        TaxReturnFacts {
            tax_year: self.tax_year,
            filing_status: self.filing_status.clone(),
            wages: self.wages,
            taxable_interest: self.taxable_interest,
            ordinary_dividends: self.ordinary_dividends,
            capital_gains: self.capital_gains,
            business_income: self.business_income,
            total_income: self.total_income,
            adjusted_gross_income: self.adjusted_gross_income,
            itemized_deductions: self.itemized_deductions,
            standard_deduction: self.standard_deduction,
            taxable_income: self.taxable_income,
            total_federal_tax: self.total_federal_tax,
            state_tax_paid: self.state_tax_paid,
            provenance: Default::default(),
        }
    }
}
