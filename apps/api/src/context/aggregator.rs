//! Context Aggregator: merges profile, tax returns, portfolio, documents,
//! and liquidity into one `FinancialContext` with a human-readable summary.
//!
//! Partial data is the expected steady state. Every sub-fetch is issued
//! concurrently and independently; a failure degrades that section to
//! absent and never aborts the aggregation.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::analysis::brackets::marginal_bracket;
use crate::analysis::estimator::{estimate_annual_income, IncomeEstimate};
use crate::analysis::metrics::{derive_tax_metrics, DerivedTaxMetrics};
use crate::context::prompts::NO_DATA_SUMMARY;
use crate::context::source::FinancialDataSource;
use crate::extraction::{DocumentKind, FactSet};
use crate::models::document::{DocumentRow, TaxReturnRow};
use crate::models::portfolio::PortfolioPositionRow;
use crate::models::profile::{FinancialProfileRow, LiquidityProfileRow};

/// Largest-holding share of portfolio value above which the summary warns
/// and the concentration opportunity fires. The boundary itself does not
/// trigger: exactly 25% is fine.
pub const CONCENTRATION_THRESHOLD_PERCENT: f64 = 25.0;

// ────────────────────────────────────────────────────────────────────────────
// Aggregate data model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeSource {
    TaxReturn,
    Profile,
    Estimated,
    Unknown,
}

/// The one reconciled income view all downstream consumers use. Estimated
/// figures stay visibly estimated; they are never laundered into facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeSnapshot {
    pub annual_income: Option<f64>,
    pub marginal_bracket: Option<f64>,
    pub effective_tax_rate: Option<f64>,
    pub source: IncomeSource,
    pub is_estimated: bool,
}

impl IncomeSnapshot {
    fn unknown() -> Self {
        Self {
            annual_income: None,
            marginal_bracket: None,
            effective_tax_rate: None,
            source: IncomeSource::Unknown,
            is_estimated: false,
        }
    }
}

/// A confirmed tax return together with its derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxReturnOverview {
    pub tax_return: TaxReturnRow,
    pub metrics: DerivedTaxMetrics,
}

/// Document metadata surfaced in the context; raw text stays out of the
/// aggregate payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOverview {
    pub id: Uuid,
    pub document_kind: String,
    pub tax_year: Option<i32>,
    pub filename: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextDetails {
    pub profile: Option<FinancialProfileRow>,
    pub tax_returns: Vec<TaxReturnOverview>,
    pub portfolio: Vec<PortfolioPositionRow>,
    pub documents: Vec<DocumentOverview>,
    pub liquidity: Option<LiquidityProfileRow>,
}

/// The aggregate view, rebuilt fresh per request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialContext {
    pub summary: String,
    pub details: ContextDetails,
    pub income: IncomeSnapshot,
    pub has_data: bool,
    pub document_count: usize,
}

/// `build_context` output plus the full document rows, which the advisor
/// prompt builder needs but the serialized context must not carry.
pub struct ContextBundle {
    pub context: FinancialContext,
    pub documents: Vec<DocumentRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregation
// ────────────────────────────────────────────────────────────────────────────

pub async fn build_context(source: &dyn FinancialDataSource, user_id: Uuid) -> FinancialContext {
    aggregate_context(source, user_id).await.context
}

pub async fn aggregate_context(source: &dyn FinancialDataSource, user_id: Uuid) -> ContextBundle {
    let (profile, tax_returns, positions, documents, liquidity) = tokio::join!(
        source.get_profile(user_id),
        source.get_tax_returns(user_id),
        source.get_positions(user_id),
        source.get_documents(user_id),
        source.get_liquidity_profile(user_id),
    );

    // A failed sub-fetch degrades to an absent section, nothing more.
    let profile = profile.unwrap_or_else(|e| {
        warn!("profile fetch failed for {user_id}: {e:#}");
        None
    });
    let tax_returns = tax_returns.unwrap_or_else(|e| {
        warn!("tax return fetch failed for {user_id}: {e:#}");
        Vec::new()
    });
    let positions = positions.unwrap_or_else(|e| {
        warn!("portfolio fetch failed for {user_id}: {e:#}");
        Vec::new()
    });
    let documents = documents.unwrap_or_else(|e| {
        warn!("document fetch failed for {user_id}: {e:#}");
        Vec::new()
    });
    let liquidity = liquidity.unwrap_or_else(|e| {
        warn!("liquidity fetch failed for {user_id}: {e:#}");
        None
    });

    let overviews: Vec<TaxReturnOverview> = tax_returns
        .iter()
        .map(|row| TaxReturnOverview {
            metrics: derive_tax_metrics(&row.facts()),
            tax_return: row.clone(),
        })
        .collect();

    let income = resolve_income(profile.as_ref(), &overviews, &documents);

    let has_data = profile.is_some()
        || !overviews.is_empty()
        || !positions.is_empty()
        || !documents.is_empty();

    let summary = if has_data {
        build_summary(profile.as_ref(), &overviews, &positions, &income)
    } else {
        NO_DATA_SUMMARY.to_string()
    };

    let context = FinancialContext {
        summary,
        has_data,
        document_count: documents.len(),
        income,
        details: ContextDetails {
            profile,
            tax_returns: overviews,
            portfolio: positions,
            documents: documents
                .iter()
                .map(|d| DocumentOverview {
                    id: d.id,
                    document_kind: d.document_kind.clone(),
                    tax_year: d.tax_year,
                    filename: d.filename.clone(),
                    status: d.status.clone(),
                })
                .collect(),
            liquidity,
        },
    };

    ContextBundle { context, documents }
}

/// Income precedence: confirmed tax return, then user-declared profile
/// income, then the estimator. Only the estimator path is flagged estimated.
fn resolve_income(
    profile: Option<&FinancialProfileRow>,
    tax_returns: &[TaxReturnOverview],
    documents: &[DocumentRow],
) -> IncomeSnapshot {
    if let Some(latest) = tax_returns.first() {
        return IncomeSnapshot {
            annual_income: latest.tax_return.total_income,
            marginal_bracket: latest.metrics.marginal_tax_bracket,
            effective_tax_rate: latest.metrics.effective_tax_rate,
            source: IncomeSource::TaxReturn,
            is_estimated: false,
        };
    }

    let filing_status = profile.and_then(|p| p.filing_status.as_deref());

    if let Some(declared) = profile.and_then(|p| p.annual_income) {
        return IncomeSnapshot {
            annual_income: Some(declared),
            marginal_bracket: Some(marginal_bracket(
                declared,
                filing_status,
                Utc::now().year(),
            )),
            effective_tax_rate: None,
            source: IncomeSource::Profile,
            is_estimated: false,
        };
    }

    let fact_sets: Vec<FactSet> = documents
        .iter()
        .filter(|d| d.is_completed())
        .filter_map(|d| d.fact_set())
        .filter(|f| f.kind() != DocumentKind::TaxReturn)
        .collect();

    match estimate_annual_income(&fact_sets) {
        Some(IncomeEstimate { annual_income, .. }) => IncomeSnapshot {
            annual_income: Some(annual_income),
            marginal_bracket: Some(marginal_bracket(
                annual_income,
                filing_status,
                Utc::now().year(),
            )),
            effective_tax_rate: None,
            source: IncomeSource::Estimated,
            is_estimated: true,
        },
        None => IncomeSnapshot::unknown(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Summary rendering
// ────────────────────────────────────────────────────────────────────────────

/// One sentence per populated section, in fixed order: profile, latest tax
/// year (or the estimate standing in for it), portfolio, then the
/// concentration warning when warranted.
fn build_summary(
    profile: Option<&FinancialProfileRow>,
    tax_returns: &[TaxReturnOverview],
    positions: &[PortfolioPositionRow],
    income: &IncomeSnapshot,
) -> String {
    let mut sentences: Vec<String> = Vec::new();

    if let Some(profile) = profile {
        let mut parts: Vec<String> = Vec::new();
        if let Some(v) = profile.annual_income {
            parts.push(format!("annual income {}", format_currency(v)));
        }
        if let Some(s) = profile.filing_status.as_deref() {
            parts.push(format!("filing status {s}"));
        }
        if let Some(s) = profile.state.as_deref() {
            parts.push(format!("state {s}"));
        }
        if let Some(s) = profile.primary_goal.as_deref() {
            parts.push(format!("primary goal {s}"));
        }
        if !parts.is_empty() {
            sentences.push(format!("Profile: {}.", parts.join(", ")));
        }
    }

    if let Some(latest) = tax_returns.first() {
        let mut parts: Vec<String> = Vec::new();
        if let Some(v) = latest.tax_return.total_income {
            parts.push(format!("total income {}", format_currency(v)));
        }
        if let Some(v) = latest.metrics.effective_tax_rate {
            parts.push(format!("effective tax rate {}", format_percent(v)));
        }
        if let Some(v) = latest.metrics.marginal_tax_bracket {
            parts.push(format!("marginal bracket {}", format_percent(v)));
        }
        if parts.is_empty() {
            sentences.push(format!("Latest tax return on file: {}.", latest.tax_return.tax_year));
        } else {
            sentences.push(format!(
                "Latest tax return ({}): {}.",
                latest.tax_return.tax_year,
                parts.join(", ")
            ));
        }
    } else if income.is_estimated {
        if let Some(v) = income.annual_income {
            sentences.push(format!(
                "Estimated annual income {} (annualized from uploaded pay documents, not verified).",
                format_currency(v)
            ));
        }
    }

    if !positions.is_empty() {
        let total_value: f64 = positions.iter().map(|p| p.current_value).sum();
        let total_gain: f64 = positions.iter().map(|p| p.unrealized_gain).sum();
        sentences.push(format!(
            "Portfolio: {} position{} with total value {}, unrealized gain {}.",
            positions.len(),
            if positions.len() == 1 { "" } else { "s" },
            format_currency(total_value),
            format_currency(total_gain),
        ));

        if let Some((symbol, weight)) = top_holding_weight(positions) {
            if weight > CONCENTRATION_THRESHOLD_PERCENT {
                sentences.push(format!(
                    "Note: {symbol} is {} of total portfolio value, above the {:.0}% concentration threshold.",
                    format_percent(weight),
                    CONCENTRATION_THRESHOLD_PERCENT,
                ));
            }
        }
    }

    if sentences.is_empty() {
        NO_DATA_SUMMARY.to_string()
    } else {
        sentences.join(" ")
    }
}

/// Symbol and percentage weight of the largest holding, when portfolio
/// value is positive.
pub fn top_holding_weight(positions: &[PortfolioPositionRow]) -> Option<(String, f64)> {
    let total: f64 = positions.iter().map(|p| p.current_value).sum();
    if total <= 0.0 {
        return None;
    }
    positions
        .iter()
        .max_by(|a, b| a.current_value.total_cmp(&b.current_value))
        .map(|p| (p.symbol.clone(), p.current_value / total * 100.0))
}

/// `$`-prefixed, thousands-separated, no decimals. Negatives keep the sign
/// ahead of the `$`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// One decimal place with a `%` suffix.
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}
