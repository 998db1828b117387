// Advisor prompt templates. The context summary is embedded verbatim; the
// actual model call happens outside this service.

use crate::models::document::DocumentRow;

/// Shown (and sent) when no financial data exists for the user. Must name
/// all three ways to supply data, never a bare "no data".
pub const NO_DATA_SUMMARY: &str = "No financial data is available for this user yet. \
To get personalized analysis: upload a tax return (1040, W-2, or paystub), \
add portfolio positions, or complete the financial profile.";

pub const ADVISOR_SYSTEM: &str = "\
You are a careful personal-finance assistant. \
Ground every statement in the financial context provided. \
Never invent figures that are not present in the context; \
if a figure is marked estimated, say so when you reference it.";

const ADVISOR_PROMPT_TEMPLATE: &str = "\
FINANCIAL CONTEXT:
{summary}

SOURCE DOCUMENT TEXT (may be truncated):
{documents}

Using only the context above, answer the user's question.";

/// Concatenated source-document budget for the prompt. Keeps the request
/// bounded no matter how many documents a user uploads.
pub const MAX_DOCUMENT_CONTEXT_CHARS: usize = 15_000;

/// Builds the advisor prompt for the external LLM-call builder: the context
/// summary verbatim plus as much raw document text as fits the budget.
pub fn build_advisor_prompt(summary: &str, documents: &[DocumentRow]) -> String {
    let mut doc_text = String::new();
    for doc in documents {
        let Some(text) = doc.extracted_text.as_deref() else {
            continue;
        };
        if doc_text.len() >= MAX_DOCUMENT_CONTEXT_CHARS {
            break;
        }
        doc_text.push_str(&format!("--- {} ---\n", doc.document_kind));
        let remaining = MAX_DOCUMENT_CONTEXT_CHARS.saturating_sub(doc_text.len());
        doc_text.push_str(&truncate_chars(text, remaining));
        doc_text.push('\n');
    }
    if doc_text.is_empty() {
        doc_text.push_str("(no document text on file)");
    }

    ADVISOR_PROMPT_TEMPLATE
        .replace("{summary}", summary)
        .replace("{documents}", &doc_text)
}

/// Char-boundary-safe prefix truncation.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
