//! Pre-consolidation filter.
//!
//! Drops spans that should not take part in consolidation: ignored and
//! deferred types, Latin-letter names, pure punctuation, Hebrew list markers
//! and date spans that are really ambiguous numerics or vocabulary words.

use tracing::debug;

use crate::core::tables::Tables;
use crate::domain::{sort_by_offsets, Category, Span};
use crate::text::{is_hebrew_letter, DocText};

/// Why a span was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    IgnoredType,
    Deferred,
    LatinName,
    NoAlphanumeric,
    ListMarker,
    AmbiguousDate,
}

/// Filter spans; output is sorted by (start, end)
pub fn filter(spans: &[Span], text: &DocText, tables: &Tables) -> Vec<Span> {
    let mut kept: Vec<Span> = spans
        .iter()
        .filter(|span| drop_reason(span, text, tables).is_none())
        .cloned()
        .collect();
    sort_by_offsets(&mut kept);

    debug!(input = spans.len(), output = kept.len(), "Filtered spans");
    kept
}

/// First drop rule that applies to a span, if any
pub fn drop_reason(span: &Span, text: &DocText, tables: &Tables) -> Option<DropReason> {
    if tables.is_ignored(&span.entity_type) {
        return Some(DropReason::IgnoredType);
    }
    if tables.is_postprocessed(&span.entity_type) {
        return Some(DropReason::Deferred);
    }

    let covered = text.slice(span.start, span.end);
    let category = tables.category(span);

    if matches!(category, Category::Name | Category::Org) && covered.chars().any(|c| c.is_ascii_alphabetic()) {
        return Some(DropReason::LatinName);
    }
    if !covered
        .chars()
        .any(|c| c.is_ascii_alphanumeric() || is_hebrew_letter(c) || c.is_numeric())
    {
        return Some(DropReason::NoAlphanumeric);
    }
    if span.len() == 2 && is_list_marker(covered) {
        return Some(DropReason::ListMarker);
    }
    if category == Category::Date && is_ambiguous_date(covered, tables) {
        return Some(DropReason::AmbiguousDate);
    }
    None
}

/// "א.", "ב'", "ג-", "ד׳"
fn is_list_marker(covered: &str) -> bool {
    let mut chars = covered.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some(mark)) => {
            is_hebrew_letter(letter) && matches!(mark, '.' | '\'' | '-' | '׳')
        }
        _ => false,
    }
}

fn is_ambiguous_date(covered: &str, tables: &Tables) -> bool {
    is_float(covered)
        || tables.is_partial_date(covered)
        || tables.is_weekday(covered)
        || tables.is_season(covered)
}

/// Bare float such as "37.5"; a single integer digit or a leading zero is
/// treated as a possible date fragment and kept
fn is_float(covered: &str) -> bool {
    let parts: Vec<&str> = covered.split('.').collect();
    if parts.len() != 2 {
        return false;
    }
    let numeric = |s: &str| !s.is_empty() && s.chars().all(char::is_numeric);
    if !numeric(parts[0]) || !numeric(parts[1]) {
        return false;
    }
    let integer_len = parts[0].chars().count();
    integer_len > 1 && !parts[0].starts_with('0')
}
