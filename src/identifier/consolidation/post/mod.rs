//! Post-consolidation rules.
//!
//! Each rule re-admits spans of a type the filter held back and adjudicates
//! their overlap with the consolidated list. Rules run in order: city/country
//! first, then medical.

pub mod city_country;
pub mod medical;

use crate::domain::Span;

pub use city_country::apply_city_country;
pub use medical::apply_medical;

/// Spans of the given types from an earlier stage
fn held_back<'a>(spans: &'a [Span], types: &'a [&str]) -> impl Iterator<Item = &'a Span> + 'a {
    spans
        .iter()
        .filter(move |span| types.contains(&span.entity_type.as_str()))
}
