//! Overlap resolvers: reduce a conflicting group to one winner.

use crate::core::tables::Tables;
use crate::domain::{Category, Span};
use crate::text::DocText;

/// Shared inputs of every resolver
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub text: &'a DocText,
    pub tables: &'a Tables,
}

impl<'a> ResolveContext<'a> {
    pub fn new(text: &'a DocText, tables: &'a Tables) -> Self {
        Self { text, tables }
    }

    pub fn category(&self, span: &Span) -> Category {
        self.tables.category(span)
    }

    pub fn covered(&self, span: &Span) -> &'a str {
        self.text.slice(span.start, span.end)
    }
}

/// Longest span; ties go to the earliest in the group
pub fn prefer_longest(group: &[Span]) -> Option<&Span> {
    group.iter().fold(None, |best: Option<&Span>, span| match best {
        Some(b) if b.len() >= span.len() => Some(b),
        _ => Some(span),
    })
}

/// First span whose category trigger phrase ends within the lookback
/// window before the span start. Falls back to the longest span.
pub fn context_based<'g>(group: &'g [Span], ctx: &ResolveContext<'_>) -> Option<&'g Span> {
    let window = ctx.tables.windows().context;

    group
        .iter()
        .find(|span| {
            ctx.tables
                .context_matcher(ctx.category(span))
                .is_some_and(|matcher| {
                    has_preceding_trigger(&matcher.end_offsets(ctx.text, &[]), span.start, window)
                })
        })
        .or_else(|| prefer_longest(group))
}

/// First span of the most frequent category; ties go to the category
/// encountered first
pub fn category_majority<'g>(group: &'g [Span], ctx: &ResolveContext<'_>) -> Option<&'g Span> {
    let mut counts: Vec<(Category, usize)> = Vec::new();
    for span in group {
        let category = ctx.category(span);
        match counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, count)) => *count += 1,
            None => counts.push((category, 1)),
        }
    }

    let majority = counts
        .iter()
        .fold(None, |best: Option<(Category, usize)>, &(category, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((category, count)),
        })?
        .0;

    group.iter().find(|span| ctx.category(span) == majority)
}

/// A trigger ending at `end` (inclusive) precedes `start` within `window`
pub fn has_preceding_trigger(end_offsets: &[usize], start: usize, window: usize) -> bool {
    end_offsets
        .iter()
        .any(|&end| end < start && start - end <= window)
}
