//! A document moving through the pipeline.
//!
//! The document owns the immutable source text and the span list written by
//! each stage. Stages read the previous list and produce the next one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text::DocText;

use super::span::Span;

/// One request document and its stage outputs
#[derive(Debug, Clone)]
pub struct Document {
    /// Caller-supplied identifier (synthetic UUID when absent)
    pub id: String,

    /// Source text
    pub text: DocText,

    /// Spans emitted by all recognizers, sorted by start
    pub recognized: Vec<Span>,

    /// Spans after smoothing
    pub smoothed: Vec<Span>,

    /// Non-overlapping spans after consolidation and post-consolidation
    pub consolidated: Vec<Span>,

    /// Consolidated spans with refined types (BIRTH_DATE / MEDICAL_DATE)
    pub granular: Vec<Span>,

    /// Masked text and per-span masks
    pub anonymized: Option<AnonymizedText>,
}

impl Document {
    /// Create a document with no stage output yet
    pub fn new(id: Option<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            text: DocText::new(text),
            recognized: Vec::new(),
            smoothed: Vec::new(),
            consolidated: Vec::new(),
            granular: Vec::new(),
            anonymized: None,
        }
    }

    /// Covered text of a span
    pub fn span_text(&self, span: &Span) -> &str {
        self.text.slice(span.start, span.end)
    }
}

/// Output of the anonymizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizedText {
    /// Text with every span replaced by its mask
    pub text: String,

    /// One entry per masked span, in start order
    pub items: Vec<MaskedItem>,
}

/// A single replaced span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskedItem {
    /// Span in the source text
    pub span: Span,

    /// Replacement string
    pub mask: String,

    /// Mask start offset in the anonymized text (chars)
    pub mask_start: usize,

    /// Mask end offset in the anonymized text (chars)
    pub mask_end: usize,

    /// Name of the operator that produced the mask
    pub operator: String,
}
