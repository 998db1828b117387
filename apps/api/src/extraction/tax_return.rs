//! 1040 field table. Labels mirror the form's line items; each pattern list
//! is ordered from the most specific phrasing to the loosest fallback.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::extraction::patterns::{
    detect_filing_status, detect_tax_year, take_amount, CompiledField, ProvenanceMap,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxReturnFacts {
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
    pub provenance: ProvenanceMap,
}

struct TaxReturnPatterns {
    wages: CompiledField,
    taxable_interest: CompiledField,
    ordinary_dividends: CompiledField,
    capital_gains: CompiledField,
    business_income: CompiledField,
    total_income: CompiledField,
    adjusted_gross_income: CompiledField,
    itemized_deductions: CompiledField,
    standard_deduction: CompiledField,
    taxable_income: CompiledField,
    total_federal_tax: CompiledField,
    state_tax_paid: CompiledField,
}

static PATTERNS: Lazy<TaxReturnPatterns> = Lazy::new(|| TaxReturnPatterns {
    wages: CompiledField::new(
        "wages",
        &[
            r"(?i)wages,?\s+salaries,?\s+tips[^\d\n]*{amount}",
            r"(?i)total\s+amount\s+from\s+form\(?s\)?\s+w-2[^\d\n]*{amount}",
            r"(?i)line\s+1a?\b[^\d\n]*{amount}",
        ],
    ),
    taxable_interest: CompiledField::new(
        "taxable_interest",
        &[
            r"(?i)taxable\s+interest[^\d\n]*{amount}",
            r"(?i)line\s+2b\b[^\d\n]*{amount}",
        ],
    ),
    ordinary_dividends: CompiledField::new(
        "ordinary_dividends",
        &[
            r"(?i)ordinary\s+dividends[^\d\n]*{amount}",
            r"(?i)line\s+3b\b[^\d\n]*{amount}",
        ],
    ),
    capital_gains: CompiledField::new(
        "capital_gains",
        &[
            r"(?i)capital\s+gain\s+or\s+\(?loss\)?[^\d\n]*{amount}",
            r"(?i)capital\s+gains?[^\d\n]*{amount}",
            r"(?i)line\s+7\b[^\d\n]*{amount}",
        ],
    ),
    business_income: CompiledField::new(
        "business_income",
        &[
            r"(?i)business\s+income\s+or\s+\(?loss\)?[^\d\n]*{amount}",
            r"(?i)business\s+income[^\d\n]*{amount}",
            r"(?i)schedule\s+c[^\d\n]*{amount}",
        ],
    ),
    total_income: CompiledField::new(
        "total_income",
        &[
            r"(?i)total\s+income[^\d\n]*{amount}",
            r"(?i)line\s+9\b[^\d\n]*{amount}",
        ],
    ),
    adjusted_gross_income: CompiledField::new(
        "adjusted_gross_income",
        &[
            r"(?i)adjusted\s+gross\s+income[^\d\n]*{amount}",
            r"(?i)\bagi\b[^\d\n]*{amount}",
            r"(?i)line\s+11\b[^\d\n]*{amount}",
        ],
    ),
    itemized_deductions: CompiledField::new(
        "itemized_deductions",
        &[
            r"(?i)itemized\s+deductions?[^\d\n]*{amount}",
            r"(?i)schedule\s+a[^\d\n]*{amount}",
        ],
    ),
    standard_deduction: CompiledField::new(
        "standard_deduction",
        &[r"(?i)standard\s+deduction[^\d\n]*{amount}"],
    ),
    taxable_income: CompiledField::new(
        "taxable_income",
        &[
            r"(?i)taxable\s+income[^\d\n]*{amount}",
            r"(?i)line\s+15\b[^\d\n]*{amount}",
        ],
    ),
    total_federal_tax: CompiledField::new(
        "total_federal_tax",
        &[
            r"(?i)total\s+tax\b[^\d\n]*{amount}",
            r"(?i)line\s+24\b[^\d\n]*{amount}",
        ],
    ),
    state_tax_paid: CompiledField::new(
        "state_tax_paid",
        &[
            r"(?i)state\s+and\s+local\s+income\s+tax(?:es)?[^\d\n]*{amount}",
            r"(?i)state\s+income\s+tax(?:es)?(?:\s+paid)?[^\d\n]*{amount}",
        ],
    ),
});

pub fn extract_tax_return(text: &str) -> TaxReturnFacts {
    let p = &*PATTERNS;
    let mut provenance = ProvenanceMap::new();

    TaxReturnFacts {
        tax_year: detect_tax_year(text),
        filing_status: detect_filing_status(text).map(String::from),
        wages: take_amount(text, &p.wages, &mut provenance),
        taxable_interest: take_amount(text, &p.taxable_interest, &mut provenance),
        ordinary_dividends: take_amount(text, &p.ordinary_dividends, &mut provenance),
        capital_gains: take_amount(text, &p.capital_gains, &mut provenance),
        business_income: take_amount(text, &p.business_income, &mut provenance),
        total_income: take_amount(text, &p.total_income, &mut provenance),
        adjusted_gross_income: take_amount(text, &p.adjusted_gross_income, &mut provenance),
        itemized_deductions: take_amount(text, &p.itemized_deductions, &mut provenance),
        standard_deduction: take_amount(text, &p.standard_deduction, &mut provenance),
        taxable_income: take_amount(text, &p.taxable_income, &mut provenance),
        total_federal_tax: take_amount(text, &p.total_federal_tax, &mut provenance),
        state_tax_paid: take_amount(text, &p.state_tax_paid, &mut provenance),
        provenance,
    }
}
