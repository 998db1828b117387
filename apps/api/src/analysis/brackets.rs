//! Static federal bracket tables. This is lookup data, not tax-law logic:
//! thresholds come straight from the IRS inflation-adjustment tables for
//! each year and are never computed.

/// The seven progressive rates, as percentages.
pub const BRACKET_RATES: [f64; 7] = [10.0, 12.0, 22.0, 24.0, 32.0, 35.0, 37.0];

/// Upper bounds for the first six brackets; the seventh is unbounded.
/// Tables exist for single and married-filing-jointly; every other filing
/// status resolves to the single table.
struct BracketTable {
    year: i32,
    single: [f64; 6],
    married_filing_jointly: [f64; 6],
}

const TABLES: &[BracketTable] = &[
    BracketTable {
        year: 2023,
        single: [11_000.0, 44_725.0, 95_375.0, 182_100.0, 231_250.0, 578_125.0],
        married_filing_jointly: [
            22_000.0, 89_450.0, 190_750.0, 364_200.0, 462_500.0, 693_750.0,
        ],
    },
    BracketTable {
        year: 2024,
        single: [11_600.0, 47_150.0, 100_525.0, 191_950.0, 243_725.0, 609_350.0],
        married_filing_jointly: [
            23_200.0, 94_300.0, 201_050.0, 383_900.0, 487_450.0, 731_200.0,
        ],
    },
    BracketTable {
        year: 2025,
        single: [11_925.0, 48_475.0, 103_350.0, 197_300.0, 250_525.0, 626_350.0],
        married_filing_jointly: [
            23_850.0, 96_950.0, 206_700.0, 394_600.0, 501_050.0, 751_600.0,
        ],
    },
];

/// Returns the marginal bracket rate (percent) for the given taxable income:
/// the rate of the smallest bracket whose upper bound is at least the
/// income. Monotone non-decreasing in income for a fixed filing status.
///
/// Unknown filing statuses use the single table; a year without a table uses
/// the most recent one available.
pub fn marginal_bracket(taxable_income: f64, filing_status: Option<&str>, tax_year: i32) -> f64 {
    let table = TABLES
        .iter()
        .find(|t| t.year == tax_year)
        .or_else(|| TABLES.iter().max_by_key(|t| t.year))
        .expect("bracket tables are non-empty");

    let thresholds = match filing_status {
        Some("married_filing_jointly") => &table.married_filing_jointly,
        _ => &table.single,
    };

    for (i, upper) in thresholds.iter().enumerate() {
        if taxable_income <= *upper {
            return BRACKET_RATES[i];
        }
    }
    BRACKET_RATES[6]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowest_bracket() {
        assert_eq!(marginal_bracket(9_000.0, Some("single"), 2023), 10.0);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        // Exactly at an upper bound stays in that bracket.
        assert_eq!(marginal_bracket(44_725.0, Some("single"), 2023), 12.0);
        assert_eq!(marginal_bracket(44_725.01, Some("single"), 2023), 22.0);
    }

    #[test]
    fn test_top_bracket_unbounded() {
        assert_eq!(marginal_bracket(2_000_000.0, Some("single"), 2024), 37.0);
    }

    #[test]
    fn test_married_jointly_uses_wider_table() {
        assert_eq!(
            marginal_bracket(90_000.0, Some("married_filing_jointly"), 2024),
            12.0
        );
        assert_eq!(marginal_bracket(90_000.0, Some("single"), 2024), 22.0);
    }

    #[test]
    fn test_other_statuses_default_to_single_table() {
        let single = marginal_bracket(120_000.0, Some("single"), 2024);
        assert_eq!(
            marginal_bracket(120_000.0, Some("head_of_household"), 2024),
            single
        );
        assert_eq!(
            marginal_bracket(120_000.0, Some("married_filing_separately"), 2024),
            single
        );
        assert_eq!(marginal_bracket(120_000.0, None, 2024), single);
    }

    #[test]
    fn test_unknown_year_uses_most_recent_table() {
        assert_eq!(
            marginal_bracket(50_000.0, Some("single"), 2031),
            marginal_bracket(50_000.0, Some("single"), 2025)
        );
    }

    #[test]
    fn test_bracket_monotone_in_income() {
        // Property sweep: the bracket never decreases as income grows.
        for status in ["single", "married_filing_jointly", "head_of_household"] {
            let mut last = 0.0_f64;
            let mut income = 0.0_f64;
            while income < 1_000_000.0 {
                let rate = marginal_bracket(income, Some(status), 2024);
                assert!(
                    rate >= last,
                    "bracket decreased at income {income} for {status}: {rate} < {last}"
                );
                last = rate;
                income += 1_237.0;
            }
        }
    }
}
