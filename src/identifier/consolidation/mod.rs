//! Consolidator.
//!
//! Groups overlapping spans with a left-to-right sweep, classifies each
//! group's conflict case and keeps the group's winners. The output is sorted
//! by start and pairwise non-overlapping.

pub mod conflict;
pub mod post;
pub mod resolver;

use tracing::{debug, trace};

use crate::core::tables::Tables;
use crate::domain::{sort_by_offsets, Span};
use crate::text::DocText;

pub use conflict::ConflictCase;
pub use resolver::ResolveContext;

/// Consolidate filtered spans into a non-overlapping list
pub fn consolidate(spans: &[Span], text: &DocText, tables: &Tables) -> Vec<Span> {
    let mut sorted = spans.to_vec();
    sort_by_offsets(&mut sorted);
    let ctx = ResolveContext::new(text, tables);

    let mut consolidated = Vec::new();
    let mut offset = 0;
    while let Some(group) = next_group(&sorted, offset) {
        let group_start = group[0].start;

        let winners = if group.len() == 1 {
            if keep_single(&group[0], &ctx) {
                vec![group[0].clone()]
            } else {
                trace!(start = group[0].start, end = group[0].end, "Dropped single span");
                Vec::new()
            }
        } else {
            let case = ConflictCase::classify(group, &ctx);
            let winners = case.resolve(group, &ctx);
            let kept: Vec<(usize, usize, &str)> = winners
                .iter()
                .map(|s| (s.start, s.end, s.entity_type.as_str()))
                .collect();
            trace!(case = %case, group = group.len(), ?kept, "Resolved conflict");
            winners
        };

        // Continue after the last kept span (or the dropped single span)
        let last_end = winners.last().map_or(group[0].end, |span| span.end);
        offset = last_end.max(group_start + 1);
        consolidated.extend(winners);
    }

    debug!(input = spans.len(), output = consolidated.len(), "Consolidated spans");
    consolidated
}

/// Next overlap group among spans starting at or after `offset`.
///
/// The group grows while the next span starts before the furthest end seen
/// so far.
fn next_group(sorted: &[Span], offset: usize) -> Option<&[Span]> {
    let first = sorted.partition_point(|span| span.start < offset);
    let head = sorted.get(first)?;

    let mut max_end = head.end;
    let mut last = first + 1;
    while let Some(span) = sorted.get(last) {
        if span.start >= max_end {
            break;
        }
        max_end = max_end.max(span.end);
        last += 1;
    }
    Some(&sorted[first..last])
}

/// A span with no overlap survives unless it is a single character or an
/// all-caps Latin token (acronym-like noise)
fn keep_single(span: &Span, ctx: &ResolveContext<'_>) -> bool {
    let covered = ctx.covered(span);
    if covered.chars().count() < 2 {
        return false;
    }
    let starts_upper_latin = covered.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    let all_caps_alpha = covered.chars().all(|c| c.is_alphabetic() && !c.is_lowercase());
    !(starts_upper_latin && all_caps_alpha)
}
