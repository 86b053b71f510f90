//! Entity smoother.
//!
//! Fixes systematic recognizer artifacts before consolidation. The single
//! rule merges two location spans of the designated recognizer that are
//! separated only by a short unrecognized number (e.g. a house number
//! between a street and a city).

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::core::tables::SmootherSettings;
use crate::domain::Span;
use crate::text::DocText;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("number pattern should compile"));

/// Merge adjacent same-type spans around a number
pub fn smooth(spans: &[Span], text: &DocText, settings: &SmootherSettings) -> Vec<Span> {
    let (mut candidates, mut smoothed): (Vec<Span>, Vec<Span>) = spans
        .iter()
        .cloned()
        .partition(|span| span.recognizer == settings.recognizer);
    candidates.sort_by_key(|span| span.start);

    let mut merged = 0;
    let mut i = 0;
    while i < candidates.len() {
        match candidates.get(i + 1) {
            Some(next) if should_merge(&candidates[i], next, text, settings) => {
                smoothed.push(candidates[i].with_bounds(candidates[i].start, next.end));
                merged += 1;
                i += 2;
            }
            _ => {
                smoothed.push(candidates[i].clone());
                i += 1;
            }
        }
    }

    smoothed.sort_by_key(|span| span.start);
    debug!(input = spans.len(), output = smoothed.len(), merged, "Smoothed spans");
    smoothed
}

fn should_merge(first: &Span, second: &Span, text: &DocText, settings: &SmootherSettings) -> bool {
    if first.entity_type != second.entity_type || !settings.merge_types.contains(&first.entity_type) {
        return false;
    }
    if second.start < first.end || second.start - first.end > settings.max_gap {
        return false;
    }
    NUMBER.is_match(text.slice(first.end, second.start))
}
