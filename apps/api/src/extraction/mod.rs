//! Field Extractor: converts raw document text plus a declared kind into a
//! typed fact set. Extraction is pure CPU-bound text scanning; nothing here
//! touches the database or the network.

pub mod handlers;
pub mod patterns;
pub mod paystub;
pub mod tax_return;
pub mod w2;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extraction::paystub::PaystubFacts;
use crate::extraction::tax_return::TaxReturnFacts;
use crate::extraction::w2::W2Facts;

/// Declared kind of an uploaded document. An unrecognized kind is a hard
/// error at the API boundary; there is no fallback shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    TaxReturn,
    W2,
    Paystub,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::TaxReturn => "tax_return",
            DocumentKind::W2 => "w2",
            DocumentKind::Paystub => "paystub",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tax_return" => Ok(DocumentKind::TaxReturn),
            "w2" => Ok(DocumentKind::W2),
            "paystub" => Ok(DocumentKind::Paystub),
            other => Err(AppError::UnsupportedDocumentKind(other.to_string())),
        }
    }
}

/// One document's structured extraction output, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "document_kind", rename_all = "snake_case")]
pub enum FactSet {
    TaxReturn(TaxReturnFacts),
    W2(W2Facts),
    Paystub(PaystubFacts),
}

impl FactSet {
    pub fn kind(&self) -> DocumentKind {
        match self {
            FactSet::TaxReturn(_) => DocumentKind::TaxReturn,
            FactSet::W2(_) => DocumentKind::W2,
            FactSet::Paystub(_) => DocumentKind::Paystub,
        }
    }

    /// Detected tax year, where the document kind carries one.
    pub fn tax_year(&self) -> Option<i32> {
        match self {
            FactSet::TaxReturn(f) => Some(f.tax_year),
            FactSet::W2(f) => Some(f.tax_year),
            FactSet::Paystub(_) => None,
        }
    }
}

/// Extracts a typed fact set from raw document text.
///
/// Pattern misses degrade individual fields to `None`; only an unsupported
/// kind is an error, and that is caught at `DocumentKind` parse time before
/// this function is reached.
pub fn extract(raw_text: &str, kind: DocumentKind) -> FactSet {
    match kind {
        DocumentKind::TaxReturn => FactSet::TaxReturn(tax_return::extract_tax_return(raw_text)),
        DocumentKind::W2 => FactSet::W2(w2::extract_w2(raw_text)),
        DocumentKind::Paystub => FactSet::Paystub(paystub::extract_paystub(raw_text)),
    }
}
