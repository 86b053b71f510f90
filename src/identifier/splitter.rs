//! Date splitter.
//!
//! Re-labels DATE-category spans as BIRTH_DATE when a birth-context phrase
//! ("נולד", "תאריך לידה", ...) ends shortly before them, otherwise as
//! MEDICAL_DATE. The anonymizer masks the two differently.

use tracing::debug;

use crate::core::tables::Tables;
use crate::domain::{Category, Span};
use crate::text::DocText;

pub const BIRTH_DATE: &str = "BIRTH_DATE";
pub const MEDICAL_DATE: &str = "MEDICAL_DATE";

/// Refine date types; other spans pass through unchanged
pub fn split_dates(spans: &[Span], text: &DocText, tables: &Tables) -> Vec<Span> {
    let birth_ends = tables.birth_context().end_offsets(text, &[]);
    let window = tables.windows().birth_context;

    let mut births = 0;
    let granular: Vec<Span> = spans
        .iter()
        .map(|span| {
            if tables.category(span) != Category::Date {
                return span.clone();
            }
            let is_birth = birth_ends
                .iter()
                .any(|&end| end < span.start && span.start - end < window);
            if is_birth {
                births += 1;
                span.relabeled(BIRTH_DATE)
            } else {
                span.relabeled(MEDICAL_DATE)
            }
        })
        .collect();

    debug!(births, output = granular.len(), "Split date spans");
    granular
}
