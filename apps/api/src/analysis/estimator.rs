//! Fallback income estimation from W-2/paystub fragments, used only when a
//! user has no confirmed tax return. The output is always tagged as an
//! estimate and must never be presented as ground truth downstream.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extraction::FactSet;

/// Assumed net-to-gross ratio when only net pay is observable. An
/// undocumented approximation inherited from product; adjust only with
/// domain confirmation.
pub const ASSUMED_TAKE_HOME_RATIO: f64 = 0.72;

/// Pay periods per year for the annualization heuristic.
pub const BIWEEKLY_PAY_PERIODS: f64 = 26.0;
pub const SEMIMONTHLY_PAY_PERIODS: f64 = 24.0;

/// Per-period gross at or above this figure is treated as semi-monthly.
/// Same caveat as the take-home ratio: a named approximation, not a fact.
pub const SEMIMONTHLY_GROSS_THRESHOLD: f64 = 8_000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeEstimate {
    pub annual_income: f64,
    /// The gross figure the annualization ran on.
    pub gross_pay_observed: f64,
    pub pay_periods_assumed: f64,
    /// True whenever gross had to be back-solved from net pay.
    pub derived_from_net_pay: bool,
    /// Always true; estimator output is never authoritative.
    pub is_estimated: bool,
}

/// Annualizes the best gross-pay evidence across completed W-2/paystub fact
/// sets. Returns `None` when the documents carry no usable pay figure at
/// all; fabricating an income from nothing is worse than reporting absence.
pub fn estimate_annual_income(fact_sets: &[FactSet]) -> Option<IncomeEstimate> {
    let max_gross = fact_sets
        .iter()
        .filter_map(|f| match f {
            FactSet::W2(w2) => w2.wages,
            FactSet::Paystub(stub) => stub.gross_pay,
            FactSet::TaxReturn(_) => None,
        })
        .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |a| a.max(v))));

    let (gross, derived_from_net_pay) = match max_gross {
        Some(g) if g > 0.0 => (g, false),
        _ => {
            // No gross anywhere: back-solve from the best net figure.
            let max_net = fact_sets
                .iter()
                .filter_map(|f| match f {
                    FactSet::Paystub(stub) => stub.net_pay,
                    _ => None,
                })
                .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |a| a.max(v))))?;
            if max_net <= 0.0 {
                return None;
            }
            (max_net / ASSUMED_TAKE_HOME_RATIO, true)
        }
    };

    let pay_periods = if gross < SEMIMONTHLY_GROSS_THRESHOLD {
        BIWEEKLY_PAY_PERIODS
    } else {
        SEMIMONTHLY_PAY_PERIODS
    };
    let annual_income = gross * pay_periods;

    debug!(
        "Estimated annual income {annual_income:.0} from gross {gross:.2} x {pay_periods} periods"
    );

    Some(IncomeEstimate {
        annual_income,
        gross_pay_observed: gross,
        pay_periods_assumed: pay_periods,
        derived_from_net_pay,
        is_estimated: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::paystub::PaystubFacts;
    use crate::extraction::w2::W2Facts;

    fn paystub(gross: Option<f64>, net: Option<f64>) -> FactSet {
        FactSet::Paystub(PaystubFacts {
            gross_pay: gross,
            net_pay: net,
            ..Default::default()
        })
    }

    fn w2(wages: Option<f64>) -> FactSet {
        FactSet::W2(W2Facts {
            tax_year: 2024,
            wages,
            ..Default::default()
        })
    }

    #[test]
    fn test_semi_monthly_annualization_at_threshold() {
        // Gross 8,333.33 is above the 8,000 threshold: 24 periods, ~200k.
        let estimate = estimate_annual_income(&[paystub(Some(8_333.33), Some(6_000.0))]).unwrap();
        assert_eq!(estimate.pay_periods_assumed, SEMIMONTHLY_PAY_PERIODS);
        assert!((estimate.annual_income - 199_999.92).abs() < 0.01);
        assert!(estimate.is_estimated);
        assert!(!estimate.derived_from_net_pay);
    }

    #[test]
    fn test_biweekly_annualization_below_threshold() {
        let estimate = estimate_annual_income(&[paystub(Some(4_000.0), None)]).unwrap();
        assert_eq!(estimate.pay_periods_assumed, BIWEEKLY_PAY_PERIODS);
        assert_eq!(estimate.annual_income, 104_000.0);
    }

    #[test]
    fn test_max_gross_across_documents_wins() {
        let estimate = estimate_annual_income(&[
            paystub(Some(3_000.0), None),
            paystub(Some(4_500.0), None),
        ])
        .unwrap();
        assert_eq!(estimate.gross_pay_observed, 4_500.0);
    }

    #[test]
    fn test_back_solves_gross_from_net() {
        let estimate = estimate_annual_income(&[paystub(None, Some(3_600.0))]).unwrap();
        assert!(estimate.derived_from_net_pay);
        assert!((estimate.gross_pay_observed - 5_000.0).abs() < 1e-9);
        assert_eq!(estimate.pay_periods_assumed, BIWEEKLY_PAY_PERIODS);
        assert_eq!(estimate.annual_income, 130_000.0);
    }

    #[test]
    fn test_zero_gross_falls_back_to_net() {
        let estimate = estimate_annual_income(&[paystub(Some(0.0), Some(3_600.0))]).unwrap();
        assert!(estimate.derived_from_net_pay);
    }

    #[test]
    fn test_w2_wages_participate() {
        let estimate = estimate_annual_income(&[w2(Some(9_000.0))]).unwrap();
        assert_eq!(estimate.gross_pay_observed, 9_000.0);
    }

    #[test]
    fn test_no_usable_figures_yields_none() {
        assert!(estimate_annual_income(&[paystub(None, None)]).is_none());
        assert!(estimate_annual_income(&[]).is_none());
    }
}
