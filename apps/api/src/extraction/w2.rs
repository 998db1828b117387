//! W-2 field table, keyed to the form's box numbers.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::extraction::patterns::{
    detect_tax_year, take_amount, take_text, CompiledField, ProvenanceMap,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct W2Facts {
    pub tax_year: i32,
    pub employer_name: Option<String>,
    /// Box 1.
    pub wages: Option<f64>,
    /// Box 2.
    pub federal_tax_withheld: Option<f64>,
    /// Box 3.
    pub social_security_wages: Option<f64>,
    /// Box 5.
    pub medicare_wages: Option<f64>,
    /// Box 17.
    pub state_tax_withheld: Option<f64>,
    pub provenance: ProvenanceMap,
}

struct W2Patterns {
    employer_name: CompiledField,
    wages: CompiledField,
    federal_tax_withheld: CompiledField,
    social_security_wages: CompiledField,
    medicare_wages: CompiledField,
    state_tax_withheld: CompiledField,
}

static PATTERNS: Lazy<W2Patterns> = Lazy::new(|| W2Patterns {
    employer_name: CompiledField::new(
        "employer_name",
        &[
            r"(?i)employer(?:'s)?\s+name(?:,\s*address(?:,\s*and\s+zip\s+code)?)?[:\s]+([^\n]+)",
            r"(?i)employer[:\s]+([^\n]+)",
        ],
    ),
    wages: CompiledField::new(
        "wages",
        &[
            r"(?i)wages,?\s+tips,?\s+other\s+comp(?:ensation)?[^\d\n]*{amount}",
            r"(?i)box\s*1\b[^\d\n]*{amount}",
        ],
    ),
    federal_tax_withheld: CompiledField::new(
        "federal_tax_withheld",
        &[
            r"(?i)federal\s+income\s+tax\s+withheld[^\d\n]*{amount}",
            r"(?i)box\s*2\b[^\d\n]*{amount}",
        ],
    ),
    social_security_wages: CompiledField::new(
        "social_security_wages",
        &[
            r"(?i)social\s+security\s+wages[^\d\n]*{amount}",
            r"(?i)box\s*3\b[^\d\n]*{amount}",
        ],
    ),
    medicare_wages: CompiledField::new(
        "medicare_wages",
        &[
            r"(?i)medicare\s+wages(?:\s+and\s+tips)?[^\d\n]*{amount}",
            r"(?i)box\s*5\b[^\d\n]*{amount}",
        ],
    ),
    state_tax_withheld: CompiledField::new(
        "state_tax_withheld",
        &[
            r"(?i)state\s+income\s+tax[^\d\n]*{amount}",
            r"(?i)box\s*17\b[^\d\n]*{amount}",
        ],
    ),
});

pub fn extract_w2(text: &str) -> W2Facts {
    let p = &*PATTERNS;
    let mut provenance = ProvenanceMap::new();

    W2Facts {
        tax_year: detect_tax_year(text),
        employer_name: take_text(text, &p.employer_name, &mut provenance),
        wages: take_amount(text, &p.wages, &mut provenance),
        federal_tax_withheld: take_amount(text, &p.federal_tax_withheld, &mut provenance),
        social_security_wages: take_amount(text, &p.social_security_wages, &mut provenance),
        medicare_wages: take_amount(text, &p.medicare_wages, &mut provenance),
        state_tax_withheld: take_amount(text, &p.state_tax_withheld, &mut provenance),
        provenance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_W2: &str = "\
Form W-2 Wage and Tax Statement 2023
Employer's name: Acme Robotics Inc
1 Wages, tips, other compensation: $98,500.00
2 Federal income tax withheld: $14,200.00
3 Social security wages: $98,500.00
5 Medicare wages and tips: $98,500.00
17 State income tax: $4,925.00
";

    #[test]
    fn test_extracts_employer_name() {
        let facts = extract_w2(SAMPLE_W2);
        assert_eq!(facts.employer_name.as_deref(), Some("Acme Robotics Inc"));
    }

    #[test]
    fn test_extracts_box_amounts() {
        let facts = extract_w2(SAMPLE_W2);
        assert_eq!(facts.wages, Some(98500.0));
        assert_eq!(facts.federal_tax_withheld, Some(14200.0));
        assert_eq!(facts.social_security_wages, Some(98500.0));
        assert_eq!(facts.medicare_wages, Some(98500.0));
        assert_eq!(facts.state_tax_withheld, Some(4925.0));
    }

    #[test]
    fn test_box_number_fallback_patterns() {
        let text = "W-2 2024\nBox 1: 72,000\nBox 2: 9,100\n";
        let facts = extract_w2(text);
        assert_eq!(facts.wages, Some(72000.0));
        assert_eq!(facts.federal_tax_withheld, Some(9100.0));
        assert_eq!(facts.tax_year, 2024);
    }

    #[test]
    fn test_absent_boxes_stay_none() {
        let facts = extract_w2("Form W-2 2023\nEmployer's name: Acme\n");
        assert_eq!(facts.wages, None);
        assert_eq!(facts.state_tax_withheld, None);
    }

    #[test]
    fn test_provenance_for_wages() {
        let facts = extract_w2(SAMPLE_W2);
        let p = facts.provenance.get("wages").expect("wages provenance");
        assert!(p.source_line.contains("Wages, tips, other compensation"));
    }
}
