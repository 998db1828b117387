//! Matching primitives for the field extractor.
//!
//! Each document field is backed by an explicit ORDERED list of regex
//! alternatives. The first alternative that yields a parseable number wins;
//! within one alternative the first line-order occurrence wins. Reordering a
//! pattern list changes extraction semantics, so the per-kind tables pin
//! their order with tests.

use chrono::{Datelike, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder substituted into field patterns at compile time.
/// Captures an optionally negative, optionally `$`-prefixed amount.
pub const AMOUNT_GROUP: &str = r"(\(?\-?\$?[\d,]+(?:\.\d+)?\)?)";

/// Plain number capture (hours, rates) without currency affordances.
pub const NUMBER_GROUP: &str = r"(\d+(?:\.\d+)?)";

/// Citation record for one populated field: the exact source line the value
/// came from plus the matched amount text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub source_line: String,
    pub matched_text: String,
}

pub type ProvenanceMap = BTreeMap<String, Provenance>;

/// A successful field match prior to being recorded into a fact set.
#[derive(Debug, Clone)]
pub struct FieldMatch {
    pub value: f64,
    pub source_line: String,
    pub matched_text: String,
}

/// One field's compiled, ordered alternative list.
pub struct CompiledField {
    pub label: &'static str,
    pub alternatives: Vec<Regex>,
}

impl CompiledField {
    /// Compiles a field table entry. `{amount}` and `{number}` placeholders
    /// expand to the shared capture groups. Patterns are static program data,
    /// so a bad pattern is a programmer error worth failing loudly on.
    pub fn new(label: &'static str, patterns: &[&str]) -> Self {
        let alternatives = patterns
            .iter()
            .map(|p| {
                let expanded = p
                    .replace("{amount}", AMOUNT_GROUP)
                    .replace("{number}", NUMBER_GROUP);
                Regex::new(&expanded)
                    .unwrap_or_else(|e| panic!("invalid pattern for field '{label}': {e}"))
            })
            .collect();
        Self {
            label,
            alternatives,
        }
    }
}

/// Tries a field's alternatives in order, returning the first match whose
/// captured amount parses. A matched-but-unparseable alternative falls
/// through to the next one; if every alternative fails the field stays
/// absent. Absent is `None`, never zero.
pub fn match_amount(text: &str, field: &CompiledField) -> Option<FieldMatch> {
    for re in &field.alternatives {
        if let Some(caps) = re.captures(text) {
            let grp = caps.get(1)?;
            if let Some(value) = parse_currency(grp.as_str()) {
                return Some(FieldMatch {
                    value,
                    source_line: line_containing(text, grp.start()),
                    matched_text: grp.as_str().to_string(),
                });
            }
        }
    }
    None
}

/// String-field variant of [`match_amount`]: first alternative with a
/// non-empty capture wins.
pub fn match_text(text: &str, field: &CompiledField) -> Option<(String, String)> {
    for re in &field.alternatives {
        if let Some(caps) = re.captures(text) {
            if let Some(grp) = caps.get(1) {
                let value = grp.as_str().trim();
                if !value.is_empty() {
                    return Some((value.to_string(), line_containing(text, grp.start())));
                }
            }
        }
    }
    None
}

/// Convenience: run [`match_amount`] and record provenance under the field label.
pub fn take_amount(
    text: &str,
    field: &CompiledField,
    provenance: &mut ProvenanceMap,
) -> Option<f64> {
    let m = match_amount(text, field)?;
    provenance.insert(
        field.label.to_string(),
        Provenance {
            source_line: m.source_line,
            matched_text: m.matched_text,
        },
    );
    Some(m.value)
}

/// Convenience: run [`match_text`] and record provenance under the field label.
pub fn take_text(
    text: &str,
    field: &CompiledField,
    provenance: &mut ProvenanceMap,
) -> Option<String> {
    let (value, source_line) = match_text(text, field)?;
    provenance.insert(
        field.label.to_string(),
        Provenance {
            source_line,
            matched_text: value.clone(),
        },
    );
    Some(value)
}

/// Normalizes a currency token to a float: strips `$`, commas, and
/// whitespace; accountant-style parentheses mean negative. Returns `None`
/// when the remainder is not a number. Never coerces garbage to zero.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let parenthesized = trimmed.starts_with('(') && trimmed.ends_with(')');
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '(' | ')') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    Some(if parenthesized { -value.abs() } else { value })
}

/// Returns the trimmed line of `text` containing byte offset `offset`.
fn line_containing(text: &str, offset: usize) -> String {
    let start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = text[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(text.len());
    text[start..end].trim().to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Filing status detection
// ────────────────────────────────────────────────────────────────────────────

/// Phrase tokens in fixed priority order. Longer, more specific tokens come
/// first: "married filing separately" contains no "single", but "single"
/// appears as an accidental substring in enough boilerplate that it must be
/// checked last.
const FILING_STATUS_TOKENS: &[(&str, &[&str])] = &[
    ("head_of_household", &["head of household", "hoh"]),
    (
        "married_filing_separately",
        &["married filing separately", "married, filing separately"],
    ),
    (
        "married_filing_jointly",
        &["married filing jointly", "married, filing jointly", "joint return"],
    ),
    ("single", &["single"]),
];

/// Scans lowercased text for filing-status phrase tokens in priority order.
pub fn detect_filing_status(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    for &(status, tokens) in FILING_STATUS_TOKENS {
        if tokens.iter().any(|t| lowered.contains(t)) {
            return Some(status);
        }
    }
    None
}

// ────────────────────────────────────────────────────────────────────────────
// Tax year detection
// ────────────────────────────────────────────────────────────────────────────

use once_cell::sync::Lazy;

static TAX_YEAR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)form\s+1040[^\n]*?(20\d{2})",
        r"(?i)tax\s+year[:\s]+(20\d{2})",
        r"\b(202\d)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid tax year pattern"))
    .collect()
});

/// Detects the document's tax year. Tries, in order: "Form 1040 ... <year>",
/// "Tax Year: <year>", then any bare 4-digit token starting "202". Falls
/// back to the previous calendar year when nothing matches.
pub fn detect_tax_year(text: &str) -> i32 {
    for re in TAX_YEAR_PATTERNS.iter() {
        if let Some(caps) = re.captures(text) {
            if let Some(year) = caps.get(1).and_then(|m| m.as_str().parse::<i32>().ok()) {
                return year;
            }
        }
    }
    Utc::now().year() - 1
}
