//! Entity spans.
//!
//! A span is a half-open character interval `[start, end)` into one document
//! text. Stages never mutate spans they received; they emit new lists.

use serde::{Deserialize, Serialize};

/// A recognized entity mention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// First character offset (inclusive)
    pub start: usize,

    /// Last character offset (exclusive)
    pub end: usize,

    /// Fine-grained entity type (e.g. "PERS", "CITY", "BIRTH_DATE")
    pub entity_type: String,

    /// Recognizer confidence in [0, 1]
    #[serde(default = "default_score")]
    pub score: f64,

    /// Name of the recognizer that produced the span
    #[serde(default)]
    pub recognizer: String,

    /// Outcome of a recognizer-side validation (e.g. ID checksum)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_result: Option<bool>,

    /// Free-form diagnostics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

fn default_score() -> f64 {
    1.0
}

impl Span {
    /// Create a new span
    pub fn new(
        start: usize,
        end: usize,
        entity_type: impl Into<String>,
        score: f64,
        recognizer: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end,
            entity_type: entity_type.into(),
            score,
            recognizer: recognizer.into(),
            validation_result: None,
            explanation: None,
        }
    }

    /// Attach a validation outcome
    pub fn with_validation(mut self, valid: bool) -> Self {
        self.validation_result = Some(valid);
        self
    }

    /// Attach an explanation
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Copy of this span with another entity type
    pub fn relabeled(&self, entity_type: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            ..self.clone()
        }
    }

    /// Copy of this span with other boundaries
    pub fn with_bounds(&self, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            ..self.clone()
        }
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn boundaries(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// True when the two spans share at least one character
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `other` lies within this span
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Stable sort by (start, end)
pub fn sort_by_offsets(spans: &mut [Span]) {
    spans.sort_by_key(|span| (span.start, span.end));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_is_half_open() {
        let a = Span::new(0, 5, "LOC", 0.9, "HebSpacy");
        let b = Span::new(5, 8, "LOC", 0.9, "HebSpacy");
        let c = Span::new(4, 6, "PERS", 0.9, "HebSpacy");

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn test_relabel_keeps_boundaries() {
        let span = Span::new(3, 9, "DATE", 0.85, "HebSpacy").with_validation(true);
        let relabeled = span.relabeled("BIRTH_DATE");

        assert_eq!(relabeled.boundaries(), (3, 9));
        assert_eq!(relabeled.entity_type, "BIRTH_DATE");
        assert_eq!(relabeled.validation_result, Some(true));
        assert_eq!(span.entity_type, "DATE");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let span: Span =
            serde_json::from_str(r#"{"start": 1, "end": 4, "entity_type": "PERS"}"#).unwrap();
        assert_eq!(span.score, 1.0);
        assert!(span.recognizer.is_empty());
        assert!(span.validation_result.is_none());
    }

    #[test]
    fn test_sort_by_offsets_is_stable() {
        let mut spans = vec![
            Span::new(4, 6, "ID", 0.6, "b"),
            Span::new(0, 3, "LOC", 0.9, "a"),
            Span::new(4, 6, "DATE", 0.6, "c"),
        ];
        sort_by_offsets(&mut spans);

        assert_eq!(spans[0].entity_type, "LOC");
        assert_eq!(spans[1].entity_type, "ID");
        assert_eq!(spans[2].entity_type, "DATE");
    }
}
