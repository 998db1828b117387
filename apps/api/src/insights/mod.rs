//! Opportunity Detector: a pure function over the aggregated context.
//!
//! Rules run independently; there is no cross-rule suppression. Results
//! keep rule-definition order rather than impact order, which product has
//! not yet asked to change.

use serde::{Deserialize, Serialize};

use crate::context::aggregator::{
    top_holding_weight, FinancialContext, CONCENTRATION_THRESHOLD_PERCENT,
};

/// Current employee 401(k) elective deferral limit. Static product data,
/// updated when the IRS limit changes.
pub const EMPLOYEE_401K_CONTRIBUTION_LIMIT: f64 = 23_500.0;

/// Income above which contribution headroom is flagged high priority.
pub const HIGH_INCOME_THRESHOLD: f64 = 150_000.0;

/// Top-holding weight above which concentration escalates to high priority.
pub const HIGH_CONCENTRATION_PERCENT: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    TaxLossHarvest,
    RetirementContribution,
    ConcentrationRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub kind: OpportunityKind,
    pub title: String,
    pub description: String,
    /// Estimated dollar impact.
    pub impact: f64,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_positions: Option<Vec<String>>,
}

pub fn detect_opportunities(context: &FinancialContext) -> Vec<Opportunity> {
    let mut opportunities = Vec::new();

    if let Some(o) = detect_tax_loss_harvest(context) {
        opportunities.push(o);
    }
    if let Some(o) = detect_retirement_contribution(context) {
        opportunities.push(o);
    }
    if let Some(o) = detect_concentration_risk(context) {
        opportunities.push(o);
    }

    opportunities
}

/// Rule 1: harvestable losses scaled by the marginal bracket.
fn detect_tax_loss_harvest(context: &FinancialContext) -> Option<Opportunity> {
    let bracket = context.income.marginal_bracket?;

    let losers: Vec<&crate::models::portfolio::PortfolioPositionRow> = context
        .details
        .portfolio
        .iter()
        .filter(|p| p.unrealized_gain < 0.0)
        .collect();
    let total_losses: f64 = losers.iter().map(|p| p.unrealized_gain.abs()).sum();
    if total_losses <= 0.0 {
        return None;
    }

    let impact = total_losses * bracket / 100.0;
    Some(Opportunity {
        kind: OpportunityKind::TaxLossHarvest,
        title: "Harvest unrealized losses".to_string(),
        description: format!(
            "Selling positions with {} of unrealized losses could offset taxable gains, \
             worth about {} at a {} marginal bracket.",
            currency(total_losses),
            currency(impact),
            percent(bracket),
        ),
        impact,
        priority: Priority::High,
        affected_positions: Some(losers.iter().map(|p| p.symbol.clone()).collect()),
    })
}

/// Rule 2: deduction value of maxing the employee 401(k) limit.
fn detect_retirement_contribution(context: &FinancialContext) -> Option<Opportunity> {
    let bracket = context.income.marginal_bracket?;
    let annual_income = context.income.annual_income?;

    let impact = EMPLOYEE_401K_CONTRIBUTION_LIMIT * bracket / 100.0;
    let priority = if annual_income > HIGH_INCOME_THRESHOLD {
        Priority::High
    } else {
        Priority::Medium
    };

    Some(Opportunity {
        kind: OpportunityKind::RetirementContribution,
        title: "Max out 401(k) contributions".to_string(),
        description: format!(
            "Contributing the full {} employee limit would reduce federal tax by about {} \
             at a {} marginal bracket.",
            currency(EMPLOYEE_401K_CONTRIBUTION_LIMIT),
            currency(impact),
            percent(bracket),
        ),
        impact,
        priority,
        affected_positions: None,
    })
}

/// Rule 3: over-exposure to a single holding. The 25% boundary is exclusive.
fn detect_concentration_risk(context: &FinancialContext) -> Option<Opportunity> {
    let (symbol, weight) = top_holding_weight(&context.details.portfolio)?;
    if weight <= CONCENTRATION_THRESHOLD_PERCENT {
        return None;
    }

    let position_value = context
        .details
        .portfolio
        .iter()
        .find(|p| p.symbol == symbol)
        .map(|p| p.current_value)?;

    let priority = if weight > HIGH_CONCENTRATION_PERCENT {
        Priority::High
    } else {
        Priority::Medium
    };

    Some(Opportunity {
        kind: OpportunityKind::ConcentrationRisk,
        title: format!("Reduce concentration in {symbol}"),
        description: format!(
            "{symbol} is {} of the portfolio ({}), leaving returns exposed to a single holding.",
            percent(weight),
            currency(position_value),
        ),
        impact: position_value,
        priority,
        affected_positions: Some(vec![symbol]),
    })
}

fn currency(value: f64) -> String {
    crate::context::aggregator::format_currency(value)
}

fn percent(value: f64) -> String {
    crate::context::aggregator::format_percent(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::aggregator::{
        ContextDetails, FinancialContext, IncomeSnapshot, IncomeSource,
    };
    use crate::models::portfolio::PortfolioPositionRow;
    use chrono::Utc;
    use uuid::Uuid;

    fn position(symbol: &str, current_value: f64, gain: f64) -> PortfolioPositionRow {
        PortfolioPositionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            shares: 1.0,
            cost_basis: current_value - gain,
            current_value,
            unrealized_gain: gain,
            unrealized_gain_percent: None,
            added_at: Utc::now(),
            price_updated_at: None,
        }
    }

    fn context(
        annual_income: Option<f64>,
        marginal_bracket: Option<f64>,
        portfolio: Vec<PortfolioPositionRow>,
    ) -> FinancialContext {
        FinancialContext {
            summary: String::new(),
            has_data: true,
            document_count: 0,
            income: IncomeSnapshot {
                annual_income,
                marginal_bracket,
                effective_tax_rate: None,
                source: IncomeSource::TaxReturn,
                is_estimated: false,
            },
            details: ContextDetails {
                profile: None,
                tax_returns: vec![],
                portfolio,
                documents: vec![],
                liquidity: None,
            },
        }
    }

    #[test]
    fn test_tax_loss_harvest_sums_only_losses() {
        let ctx = context(
            Some(200_000.0),
            Some(32.0),
            vec![
                position("AAPL", 50_000.0, -4_000.0),
                position("MSFT", 40_000.0, 6_000.0),
                position("NVDA", 30_000.0, -1_000.0),
            ],
        );
        let opps = detect_opportunities(&ctx);
        let harvest = opps
            .iter()
            .find(|o| o.kind == OpportunityKind::TaxLossHarvest)
            .expect("harvest opportunity");
        // 5,000 in losses at 32% -> 1,600.
        assert!((harvest.impact - 1_600.0).abs() < 1e-9);
        assert_eq!(harvest.priority, Priority::High);
        assert_eq!(
            harvest.affected_positions.as_deref(),
            Some(&["AAPL".to_string(), "NVDA".to_string()][..])
        );
    }

    #[test]
    fn test_no_harvest_without_losses() {
        let ctx = context(Some(100_000.0), Some(22.0), vec![position("VTI", 10_000.0, 500.0)]);
        assert!(detect_opportunities(&ctx)
            .iter()
            .all(|o| o.kind != OpportunityKind::TaxLossHarvest));
    }

    #[test]
    fn test_no_harvest_without_bracket() {
        let ctx = context(None, None, vec![position("VTI", 10_000.0, -500.0)]);
        assert!(detect_opportunities(&ctx)
            .iter()
            .all(|o| o.kind != OpportunityKind::TaxLossHarvest));
    }

    #[test]
    fn test_retirement_impact_is_limit_times_bracket() {
        let ctx = context(Some(100_000.0), Some(22.0), vec![]);
        let opps = detect_opportunities(&ctx);
        let retirement = opps
            .iter()
            .find(|o| o.kind == OpportunityKind::RetirementContribution)
            .expect("retirement opportunity");
        assert!((retirement.impact - EMPLOYEE_401K_CONTRIBUTION_LIMIT * 0.22).abs() < 1e-9);
        assert_eq!(retirement.priority, Priority::Medium);
    }

    #[test]
    fn test_retirement_high_priority_above_income_threshold() {
        let ctx = context(Some(150_001.0), Some(24.0), vec![]);
        let retirement = detect_opportunities(&ctx)
            .into_iter()
            .find(|o| o.kind == OpportunityKind::RetirementContribution)
            .unwrap();
        assert_eq!(retirement.priority, Priority::High);
    }

    #[test]
    fn test_retirement_needs_both_income_and_bracket() {
        let ctx = context(None, Some(24.0), vec![]);
        assert!(detect_opportunities(&ctx)
            .iter()
            .all(|o| o.kind != OpportunityKind::RetirementContribution));
    }

    fn concentration_only(top_value: f64, rest: f64) -> Option<Opportunity> {
        let ctx = context(
            None,
            None,
            vec![position("TSLA", top_value, 0.0), position("VTI", rest, 0.0)],
        );
        detect_opportunities(&ctx)
            .into_iter()
            .find(|o| o.kind == OpportunityKind::ConcentrationRisk)
    }

    #[test]
    fn test_concentration_at_50_percent_is_high() {
        let opp = concentration_only(50_000.0, 50_000.0).expect("should fire at 50%");
        assert_eq!(opp.priority, Priority::High);
        assert_eq!(opp.impact, 50_000.0);
    }

    #[test]
    fn test_concentration_at_26_percent_is_medium() {
        let opp = concentration_only(26_000.0, 74_000.0);
        // 26,000 of 100,000 -> 26%: fires at medium.
        let opp = opp.expect("should fire at 26%");
        assert_eq!(opp.priority, Priority::Medium);
    }

    #[test]
    fn test_concentration_boundaries_do_not_fire() {
        // 24% and exactly 25% both stay quiet.
        assert!(concentration_only(24_000.0, 76_000.0).is_none());
        assert!(concentration_only(25_000.0, 75_000.0).is_none());
    }

    #[test]
    fn test_rule_definition_order_not_impact_order() {
        // Harvest impact (small) still precedes retirement impact (large).
        let ctx = context(
            Some(200_000.0),
            Some(35.0),
            vec![position("AAPL", 90_000.0, -100.0), position("VTI", 110_000.0, 0.0)],
        );
        let opps = detect_opportunities(&ctx);
        let kinds: Vec<OpportunityKind> = opps.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OpportunityKind::TaxLossHarvest,
                OpportunityKind::RetirementContribution,
                OpportunityKind::ConcentrationRisk,
            ]
        );
        assert!(opps[0].impact < opps[1].impact);
    }

    #[test]
    fn test_empty_context_detects_nothing() {
        let ctx = context(None, None, vec![]);
        assert!(detect_opportunities(&ctx).is_empty());
    }
}
