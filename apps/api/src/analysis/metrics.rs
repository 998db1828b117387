//! Derived metrics over a tax-return fact set. Everything here is computed
//! on demand and never stored independently of its inputs.

use serde::{Deserialize, Serialize};

use crate::analysis::brackets::marginal_bracket;
use crate::extraction::tax_return::TaxReturnFacts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionKind {
    Standard,
    Itemized,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedTaxMetrics {
    /// total_federal_tax / total_income * 100; `None` unless total income is
    /// present and positive.
    pub effective_tax_rate: Option<f64>,
    /// Marginal rate (percent) at the return's taxable income.
    pub marginal_tax_bracket: Option<f64>,
    pub deduction_used: DeductionKind,
}

pub fn derive_tax_metrics(facts: &TaxReturnFacts) -> DerivedTaxMetrics {
    let effective_tax_rate = match (facts.total_federal_tax, facts.total_income) {
        (Some(tax), Some(income)) if income > 0.0 => Some(tax / income * 100.0),
        _ => None,
    };

    let marginal_tax_bracket = facts
        .taxable_income
        .map(|ti| marginal_bracket(ti, facts.filing_status.as_deref(), facts.tax_year));

    // Itemized only when both figures are present and itemized strictly wins;
    // a tie or a missing figure resolves to standard.
    let deduction_used = match (facts.itemized_deductions, facts.standard_deduction) {
        (Some(itemized), Some(standard)) if itemized > standard => DeductionKind::Itemized,
        _ => DeductionKind::Standard,
    };

    DerivedTaxMetrics {
        effective_tax_rate,
        marginal_tax_bracket,
        deduction_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts_with(
        total_income: Option<f64>,
        total_federal_tax: Option<f64>,
        taxable_income: Option<f64>,
    ) -> TaxReturnFacts {
        TaxReturnFacts {
            tax_year: 2024,
            filing_status: Some("single".to_string()),
            total_income,
            total_federal_tax,
            taxable_income,
            ..Default::default()
        }
    }

    #[test]
    fn test_effective_rate_matches_ratio() {
        // 66,000 / 300,000 * 100 = 22.0
        let m = derive_tax_metrics(&facts_with(Some(300_000.0), Some(66_000.0), None));
        let rate = m.effective_tax_rate.unwrap();
        assert!((rate - 22.0).abs() < 1e-9, "rate was {rate}");
    }

    #[test]
    fn test_effective_rate_none_when_income_zero() {
        let m = derive_tax_metrics(&facts_with(Some(0.0), Some(5_000.0), None));
        assert_eq!(m.effective_tax_rate, None);
    }

    #[test]
    fn test_effective_rate_none_when_income_negative() {
        let m = derive_tax_metrics(&facts_with(Some(-12_000.0), Some(0.0), None));
        assert_eq!(m.effective_tax_rate, None);
    }

    #[test]
    fn test_effective_rate_none_when_tax_missing() {
        let m = derive_tax_metrics(&facts_with(Some(100_000.0), None, None));
        assert_eq!(m.effective_tax_rate, None);
    }

    #[test]
    fn test_marginal_bracket_from_taxable_income() {
        let m = derive_tax_metrics(&facts_with(None, None, Some(120_000.0)));
        assert_eq!(m.marginal_tax_bracket, Some(24.0));
    }

    #[test]
    fn test_marginal_bracket_none_without_taxable_income() {
        let m = derive_tax_metrics(&facts_with(Some(100_000.0), Some(18_000.0), None));
        assert_eq!(m.marginal_tax_bracket, None);
    }

    #[test]
    fn test_itemized_only_when_strictly_greater() {
        let mut facts = facts_with(None, None, None);
        facts.itemized_deductions = Some(20_000.0);
        facts.standard_deduction = Some(14_600.0);
        assert_eq!(derive_tax_metrics(&facts).deduction_used, DeductionKind::Itemized);
    }

    #[test]
    fn test_deduction_tie_resolves_to_standard() {
        let mut facts = facts_with(None, None, None);
        facts.itemized_deductions = Some(14_600.0);
        facts.standard_deduction = Some(14_600.0);
        assert_eq!(derive_tax_metrics(&facts).deduction_used, DeductionKind::Standard);
    }

    #[test]
    fn test_deduction_defaults_to_standard_when_either_missing() {
        let mut facts = facts_with(None, None, None);
        facts.itemized_deductions = Some(30_000.0);
        facts.standard_deduction = None;
        assert_eq!(derive_tax_metrics(&facts).deduction_used, DeductionKind::Standard);

        facts.itemized_deductions = None;
        facts.standard_deduction = Some(14_600.0);
        assert_eq!(derive_tax_metrics(&facts).deduction_used, DeductionKind::Standard);
    }
}
