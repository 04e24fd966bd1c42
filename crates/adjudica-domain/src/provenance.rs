//! Provenance tracking for extracted facts

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The document location a fact value was read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactProvenance {
    /// Source document identifier
    pub doc_id: String,

    /// Document classification (e.g., "invoice", "policy", "registration")
    pub doc_type: String,

    /// Extraction run that produced the value
    pub run_id: String,

    /// Page number, when the extractor reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Verbatim text the value was read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,

    /// Character offsets `[start, end)` of the quote within the page text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offsets: Option<(usize, usize)>,
}

impl FactProvenance {
    /// Create a provenance entry without location details
    pub fn new(doc_id: impl Into<String>, doc_type: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            doc_type: doc_type.into(),
            run_id: run_id.into(),
            page: None,
            quote: None,
            offsets: None,
        }
    }

    /// Attach a page number
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach a supporting quote
    pub fn with_quote(mut self, quote: impl Into<String>) -> Self {
        self.quote = Some(quote.into());
        self
    }

    /// Whether the entry points at a concrete location in the document.
    ///
    /// Used for the gate's provenance coverage ratio.
    pub fn is_located(&self) -> bool {
        self.page.is_some() || self.quote.as_deref().is_some_and(|q| !q.trim().is_empty())
    }
}

/// Order extraction run ids from oldest to most recent.
///
/// Runs of ASCII digits compare by numeric value, so `run-10` sorts after
/// `run-9`; everything else compares bytewise. Ids that are equal under
/// this ordering but differ in text (`run-01` vs `run-1`) fall back to a
/// plain string comparison.
pub fn compare_run_ids(a: &str, b: &str) -> Ordering {
    let (mut a_rest, mut b_rest) = (a.as_bytes(), b.as_bytes());
    loop {
        match (a_rest.first(), b_rest.first()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let (a_num, a_tail) = split_digits(a_rest);
                let (b_num, b_tail) = split_digits(b_rest);
                let ordering = compare_digit_runs(a_num, b_num);
                if ordering != Ordering::Equal {
                    return ordering;
                }
                a_rest = a_tail;
                b_rest = b_tail;
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(y);
                }
                a_rest = &a_rest[1..];
                b_rest = &b_rest[1..];
            }
        }
    }
}

fn split_digits(bytes: &[u8]) -> (&[u8], &[u8]) {
    let end = bytes
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(bytes.len());
    bytes.split_at(end)
}

/// Numeric comparison of two digit runs of any length
fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let trim = |d: &[u8]| -> usize { d.iter().take_while(|&&c| c == b'0').count() };
    let a = &a[trim(a)..];
    let b = &b[trim(b)..];
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
