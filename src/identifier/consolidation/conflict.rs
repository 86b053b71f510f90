//! Conflict cases and their resolution policies.

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::{Category, Span};

use super::resolver::{category_majority, context_based, prefer_longest, ResolveContext};

/// Shape of an overlap group: category cardinality x boundary cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictCase {
    /// One category, one (start, end) pair
    ExactMatch,
    /// One category, several boundaries
    SameCategory,
    /// Several categories, one (start, end) pair
    SameBoundaries,
    /// Several categories, several boundaries
    Mixed,
}

impl ConflictCase {
    /// Classify a group of two or more overlapping spans
    pub fn classify(group: &[Span], ctx: &ResolveContext<'_>) -> Self {
        let categories: BTreeSet<Category> = group.iter().map(|s| ctx.category(s)).collect();
        let boundaries: BTreeSet<(usize, usize)> = group.iter().map(Span::boundaries).collect();

        match (categories.len() == 1, boundaries.len() == 1) {
            (true, true) => ConflictCase::ExactMatch,
            (true, false) => ConflictCase::SameCategory,
            (false, true) => ConflictCase::SameBoundaries,
            (false, false) => ConflictCase::Mixed,
        }
    }

    /// Reduce the group to its non-overlapping winners
    pub fn resolve(self, group: &[Span], ctx: &ResolveContext<'_>) -> Vec<Span> {
        match self {
            ConflictCase::ExactMatch => group.first().cloned().into_iter().collect(),
            ConflictCase::SameCategory => longest(group),
            ConflictCase::SameBoundaries => same_boundaries(group, ctx),
            ConflictCase::Mixed if ctx.tables.settings().split_nested_mixed => split_nested(group),
            ConflictCase::Mixed => longest(group),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictCase::ExactMatch => "EXACT_MATCH",
            ConflictCase::SameCategory => "SAME_CATEGORY",
            ConflictCase::SameBoundaries => "SAME_BOUNDARIES",
            ConflictCase::Mixed => "MIXED",
        }
    }
}

impl fmt::Display for ConflictCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn longest(group: &[Span]) -> Vec<Span> {
    prefer_longest(group).cloned().into_iter().collect()
}

fn first_of(group: &[Span], category: Category, ctx: &ResolveContext<'_>) -> Option<Span> {
    group.iter().find(|s| ctx.category(s) == category).cloned()
}

/// Category-pair policies for spans sharing one boundary pair
fn same_boundaries(group: &[Span], ctx: &ResolveContext<'_>) -> Vec<Span> {
    let categories: BTreeSet<Category> = group.iter().map(|s| ctx.category(s)).collect();
    let is_pair = |a: Category, b: Category| categories.len() == 2 && categories.contains(&a) && categories.contains(&b);

    let winner = if categories.len() > 2 {
        prefer_longest(group).cloned()
    } else if is_pair(Category::Id, Category::Contact) {
        context_based(group, ctx).cloned()
    } else if is_pair(Category::Id, Category::Date) {
        if group.len() > 2 {
            category_majority(group, ctx).cloned()
        } else {
            id_or_date(group, ctx)
        }
    } else if is_pair(Category::Contact, Category::Date) {
        if group.len() > 2 {
            category_majority(group, ctx).cloned()
        } else {
            contact_or_date(group, ctx)
        }
    } else if is_pair(Category::Contact, Category::Org) {
        if group.len() > 2 {
            category_majority(group, ctx).cloned()
        } else {
            first_of(group, Category::Contact, ctx)
        }
    } else {
        prefer_longest(group).cloned()
    };

    winner.into_iter().collect()
}

/// A checksum-valid ID beats a date; so does any ID against a statistical
/// date that is not a plain number
fn id_or_date(group: &[Span], ctx: &ResolveContext<'_>) -> Option<Span> {
    let id = first_of(group, Category::Id, ctx)?;
    let date = first_of(group, Category::Date, ctx)?;

    let date_is_number = {
        let covered = ctx.covered(&date);
        !covered.is_empty() && covered.chars().all(char::is_numeric)
    };

    if id.validation_result == Some(true) || (ctx.tables.is_statistical(&date) && !date_is_number) {
        Some(id)
    } else {
        Some(date)
    }
}

/// A contact beats a date only when the date came from the statistical model
fn contact_or_date(group: &[Span], ctx: &ResolveContext<'_>) -> Option<Span> {
    let contact = first_of(group, Category::Contact, ctx)?;
    let date = first_of(group, Category::Date, ctx)?;

    if ctx.tables.is_statistical(&date) {
        Some(contact)
    } else {
        Some(date)
    }
}

/// Split a longest span around one nested span sharing its start or end.
///
/// Applies only with exactly two distinct boundaries and a unique longest
/// span; otherwise the longest span wins.
fn split_nested(group: &[Span]) -> Vec<Span> {
    let Some(outer) = prefer_longest(group) else {
        return Vec::new();
    };
    let boundaries: BTreeSet<(usize, usize)> = group.iter().map(Span::boundaries).collect();
    let outer_count = group
        .iter()
        .filter(|s| s.boundaries() == outer.boundaries())
        .count();
    if boundaries.len() > 2 || outer_count > 1 {
        return vec![outer.clone()];
    }

    let Some(inner) = group.iter().find(|s| s.boundaries() != outer.boundaries()) else {
        return vec![outer.clone()];
    };

    if inner.start == outer.start && inner.end < outer.end {
        vec![inner.clone(), outer.with_bounds(inner.end, outer.end)]
    } else if inner.end == outer.end && inner.start > outer.start {
        vec![outer.with_bounds(outer.start, inner.start), inner.clone()]
    } else {
        vec![outer.clone()]
    }
}
