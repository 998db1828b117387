//! Paystub field table.
//!
//! Gross and net pay each try their year-to-date phrasing before the
//! per-period phrasing, so a stub carrying both yields the YTD figure. The
//! pay-period range is pulled with a single two-date pattern.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extraction::patterns::{take_amount, CompiledField, Provenance, ProvenanceMap};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaystubFacts {
    /// YTD gross when present, else per-period gross.
    pub gross_pay: Option<f64>,
    /// YTD net when present, else per-period net.
    pub net_pay: Option<f64>,
    pub federal_tax_withheld: Option<f64>,
    pub regular_hours: Option<f64>,
    pub hourly_rate: Option<f64>,
    pub pay_period_start: Option<String>,
    pub pay_period_end: Option<String>,
    pub provenance: ProvenanceMap,
}

struct PaystubPatterns {
    gross_pay: CompiledField,
    net_pay: CompiledField,
    federal_tax_withheld: CompiledField,
    regular_hours: CompiledField,
    hourly_rate: CompiledField,
}

static PATTERNS: Lazy<PaystubPatterns> = Lazy::new(|| PaystubPatterns {
    gross_pay: CompiledField::new(
        "gross_pay",
        &[
            r"(?i)(?:ytd|year[\s-]?to[\s-]?date)\s+gross(?:\s+pay)?[^\d\n]*{amount}",
            r"(?i)gross\s+pay\s+ytd[^\d\n]*{amount}",
            r"(?i)gross\s+pay[^\d\n]*{amount}",
            r"(?i)(?:total\s+gross|gross\s+earnings)[^\d\n]*{amount}",
        ],
    ),
    net_pay: CompiledField::new(
        "net_pay",
        &[
            r"(?i)(?:ytd|year[\s-]?to[\s-]?date)\s+net(?:\s+pay)?[^\d\n]*{amount}",
            r"(?i)net\s+pay[^\d\n]*{amount}",
            r"(?i)take[\s-]?home(?:\s+pay)?[^\d\n]*{amount}",
        ],
    ),
    federal_tax_withheld: CompiledField::new(
        "federal_tax_withheld",
        &[
            r"(?i)federal\s+(?:income\s+)?tax(?:\s+withheld)?[^\d\n]*{amount}",
            r"(?i)fed\s+w/?h[^\d\n]*{amount}",
        ],
    ),
    regular_hours: CompiledField::new(
        "regular_hours",
        &[
            r"(?i)regular\s+hours[^\d\n]*{number}",
            r"(?i)hours\s+worked[^\d\n]*{number}",
        ],
    ),
    hourly_rate: CompiledField::new(
        "hourly_rate",
        &[
            r"(?i)hourly\s+rate[^\d\n]*{amount}",
            r"(?i)\brate\b[^\d\n]*{amount}",
        ],
    ),
});

static PAY_PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:pay\s+)?period[^\n]*?(\d{1,2}/\d{1,2}/\d{2,4})\s*(?:-|to|through)\s*(\d{1,2}/\d{1,2}/\d{2,4})",
    )
    .expect("invalid pay period pattern")
});

pub fn extract_paystub(text: &str) -> PaystubFacts {
    let p = &*PATTERNS;
    let mut provenance = ProvenanceMap::new();

    let mut facts = PaystubFacts {
        gross_pay: take_amount(text, &p.gross_pay, &mut provenance),
        net_pay: take_amount(text, &p.net_pay, &mut provenance),
        federal_tax_withheld: take_amount(text, &p.federal_tax_withheld, &mut provenance),
        regular_hours: take_amount(text, &p.regular_hours, &mut provenance),
        hourly_rate: take_amount(text, &p.hourly_rate, &mut provenance),
        ..Default::default()
    };

    if let Some(caps) = PAY_PERIOD.captures(text) {
        let start = caps.get(1).map(|m| m.as_str().to_string());
        let end = caps.get(2).map(|m| m.as_str().to_string());
        if let (Some(start), Some(end)) = (start, end) {
            provenance.insert(
                "pay_period".to_string(),
                Provenance {
                    source_line: caps.get(0).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
                    matched_text: format!("{start} - {end}"),
                },
            );
            facts.pay_period_start = Some(start);
            facts.pay_period_end = Some(end);
        }
    }

    facts.provenance = provenance;
    facts
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAYSTUB: &str = "\
ACME ROBOTICS INC  Earnings Statement
Pay Period: 06/01/2024 - 06/15/2024
Regular Hours: 86.67  Hourly Rate: $48.08
Gross Pay: $4,166.67
Federal Income Tax: $512.00
Net Pay: $3,100.00
YTD Gross: $50,000.04
YTD Net: $37,200.00
";

    #[test]
    fn test_ytd_gross_preferred_over_per_period() {
        let facts = extract_paystub(SAMPLE_PAYSTUB);
        assert_eq!(facts.gross_pay, Some(50000.04));
    }

    #[test]
    fn test_ytd_net_preferred_over_per_period() {
        let facts = extract_paystub(SAMPLE_PAYSTUB);
        assert_eq!(facts.net_pay, Some(37200.0));
    }

    #[test]
    fn test_per_period_used_when_no_ytd_present() {
        let text = "Gross Pay: $8,333.33\nNet Pay: $6,000.00\n";
        let facts = extract_paystub(text);
        assert_eq!(facts.gross_pay, Some(8333.33));
        assert_eq!(facts.net_pay, Some(6000.0));
    }

    #[test]
    fn test_hours_and_rate() {
        let facts = extract_paystub(SAMPLE_PAYSTUB);
        assert_eq!(facts.regular_hours, Some(86.67));
        assert_eq!(facts.hourly_rate, Some(48.08));
    }

    #[test]
    fn test_pay_period_two_date_range() {
        let facts = extract_paystub(SAMPLE_PAYSTUB);
        assert_eq!(facts.pay_period_start.as_deref(), Some("06/01/2024"));
        assert_eq!(facts.pay_period_end.as_deref(), Some("06/15/2024"));
    }

    #[test]
    fn test_no_federal_match_is_none() {
        let facts = extract_paystub("Gross Pay: $2,000.00\nNet Pay: $1,600.00\n");
        assert_eq!(facts.federal_tax_withheld, None);
    }

    #[test]
    fn test_provenance_names_ytd_line() {
        let facts = extract_paystub(SAMPLE_PAYSTUB);
        let p = facts.provenance.get("gross_pay").expect("gross provenance");
        assert!(p.source_line.contains("YTD Gross"));
    }
}
