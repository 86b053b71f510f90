//! Span contract checks.
//!
//! Upstream spans must satisfy `start < end <= len`. After consolidation the
//! list must also be sorted and pairwise non-overlapping.

use thiserror::Error;

use crate::domain::Span;

/// A span list that breaks the pipeline contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanContractViolation {
    #[error("Empty span {entity_type} [{start}, {end}) at stage {stage}")]
    EmptySpan {
        stage: &'static str,
        entity_type: String,
        start: usize,
        end: usize,
    },

    #[error("Span {entity_type} [{start}, {end}) exceeds text length {len} at stage {stage}")]
    OutOfBounds {
        stage: &'static str,
        entity_type: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Spans [{first_start}, {first_end}) and [{second_start}, {second_end}) overlap at stage {stage}")]
    Overlap {
        stage: &'static str,
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },
}

/// Check `start < end <= text_len` for every span
pub fn validate_bounds(
    stage: &'static str,
    spans: &[Span],
    text_len: usize,
) -> Result<(), SpanContractViolation> {
    for span in spans {
        if span.start >= span.end {
            return Err(SpanContractViolation::EmptySpan {
                stage,
                entity_type: span.entity_type.clone(),
                start: span.start,
                end: span.end,
            });
        }
        if span.end > text_len {
            return Err(SpanContractViolation::OutOfBounds {
                stage,
                entity_type: span.entity_type.clone(),
                start: span.start,
                end: span.end,
                len: text_len,
            });
        }
    }
    Ok(())
}

/// Check bounds plus sorted, pairwise non-overlapping order
pub fn validate_disjoint(
    stage: &'static str,
    spans: &[Span],
    text_len: usize,
) -> Result<(), SpanContractViolation> {
    validate_bounds(stage, spans, text_len)?;

    for pair in spans.windows(2) {
        if pair[0].end > pair[1].start {
            return Err(SpanContractViolation::Overlap {
                stage,
                first_start: pair[0].start,
                first_end: pair[0].end,
                second_start: pair[1].start,
                second_end: pair[1].end,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let ok = vec![Span::new(0, 3, "LOC", 0.9, "a")];
        assert!(validate_bounds("input", &ok, 3).is_ok());

        let empty = vec![Span::new(2, 2, "LOC", 0.9, "a")];
        assert!(matches!(
            validate_bounds("input", &empty, 3),
            Err(SpanContractViolation::EmptySpan { .. })
        ));

        let long = vec![Span::new(0, 4, "LOC", 0.9, "a")];
        assert!(matches!(
            validate_bounds("input", &long, 3),
            Err(SpanContractViolation::OutOfBounds { len: 3, .. })
        ));
    }

    #[test]
    fn test_disjoint() {
        let touching = vec![
            Span::new(0, 3, "LOC", 0.9, "a"),
            Span::new(3, 5, "PERS", 0.9, "a"),
        ];
        assert!(validate_disjoint("consolidated", &touching, 5).is_ok());

        let overlapping = vec![
            Span::new(0, 4, "LOC", 0.9, "a"),
            Span::new(3, 5, "PERS", 0.9, "a"),
        ];
        let err = validate_disjoint("consolidated", &overlapping, 5).unwrap_err();
        assert!(err.to_string().contains("overlap"));
    }
}
