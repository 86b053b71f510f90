//! City / country boundary rule.
//!
//! Lexicon CITY and COUNTRY spans are merged back into the consolidated
//! list. Overlaps are settled by a fixed type priority: person and
//! organization names beat cities and countries, which beat generic
//! locations. The losing span is trimmed to the winner's edge, or emptied
//! when nothing of it is left.

use tracing::debug;

use crate::core::tables::Tables;
use crate::domain::{sort_by_offsets, Span};
use crate::text::DocText;

use super::held_back;

/// Types re-admitted by this rule
pub const CITY_COUNTRY_TYPES: &[&str] = &["COUNTRY", "CITY"];

/// Types whose one-letter preposition scraps are dropped
const LOCATION_TYPES: &[&str] = &["LOC", "GPE", "COUNTRY", "CITY"];

/// Merge CITY / COUNTRY candidates and restore non-overlap
pub fn apply_city_country(
    consolidated: &[Span],
    smoothed: &[Span],
    text: &DocText,
    tables: &Tables,
) -> Vec<Span> {
    let min_score = tables.settings().min_location_score;
    let candidates: Vec<Span> = held_back(smoothed, CITY_COUNTRY_TYPES)
        .filter(|span| span.score >= min_score)
        .cloned()
        .collect();
    if candidates.is_empty() {
        return consolidated.to_vec();
    }

    let admitted = candidates.len();
    let mut spans = consolidated.to_vec();
    spans.extend(candidates);

    let spans = trim_by_priority(spans, text, tables);
    debug!(admitted, output = spans.len(), "Applied city/country rule");
    spans
}

/// Restore non-overlap by trimming the lower-priority side of every
/// overlap, then drop empty spans and one-letter preposition scraps.
///
/// Passes repeat until no boundary moves; every move shrinks a span, so
/// this terminates.
pub fn trim_by_priority(mut spans: Vec<Span>, text: &DocText, tables: &Tables) -> Vec<Span> {
    let mut passes = 0;
    loop {
        spans.retain(|span| !span.is_empty());
        sort_by_offsets(&mut spans);
        passes += 1;
        if !sweep(&mut spans, tables) {
            break;
        }
    }

    let before = spans.len();
    spans.retain(|span| !span.is_empty() && !is_preposition_scrap(span, text, tables));
    sort_by_offsets(&mut spans);

    debug!(passes, scraps = before - spans.len(), "Trimmed overlaps by priority");
    spans
}

/// One forward pass over start-sorted spans. Returns whether any boundary
/// moved.
fn sweep(spans: &mut [Span], tables: &Tables) -> bool {
    let mut changed = false;
    let mut prev = 0;

    for cur in 1..spans.len() {
        let (prev_start, prev_end) = spans[prev].boundaries();
        let (cur_start, cur_end) = spans[cur].boundaries();

        if cur_start > prev_end {
            prev = cur;
            continue;
        }

        if cur_start > prev_start + 1 && prev_end > cur_end {
            // Strictly inside the previous span: the longer span wins
            spans[cur].end = cur_start;
            changed |= cur_end != cur_start;
        } else if tables.priority_of(&spans[cur].entity_type) <= tables.priority_of(&spans[prev].entity_type) {
            spans[prev].end = cur_start;
            changed |= prev_end != cur_start;
            prev = cur;
        } else if prev_end <= cur_end {
            spans[cur].start = prev_end;
            changed |= cur_start != prev_end;
            prev = cur;
        } else {
            spans[cur].start = cur_end;
            changed |= cur_start != cur_end;
        }
    }

    changed
}

/// One-character location span that is only a preposition ("ב", "ל", ...)
fn is_preposition_scrap(span: &Span, text: &DocText, tables: &Tables) -> bool {
    span.len() == 1
        && LOCATION_TYPES.contains(&span.entity_type.as_str())
        && text
            .char_at(span.start)
            .is_some_and(|c| tables.settings().location_prepositions.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(spans: &[Span]) -> Vec<(usize, usize, &str)> {
        spans
            .iter()
            .map(|s| (s.start, s.end, s.entity_type.as_str()))
            .collect()
    }

    #[test]
    fn test_no_candidates_is_identity() {
        let tables = Tables::builtin().unwrap();
        let text = DocText::new("משה גר בחיפה");
        let consolidated = vec![Span::new(0, 3, "PERS", 0.9, "HebSpacy")];
        let smoothed = vec![Span::new(8, 12, "CITY", 0.3, "IsraeliCityRecognizer")];

        let out = apply_city_country(&consolidated, &smoothed, &text, &tables);
        assert_eq!(out, consolidated);
    }

    #[test]
    fn test_city_inside_loc_is_dropped() {
        // "בית חולים בחיפה הגדול": the city sits strictly inside a longer LOC
        let tables = Tables::builtin().unwrap();
        let text = DocText::new("בית חולים בחיפה הגדול");
        let consolidated = vec![Span::new(0, 21, "LOC", 0.8, "HebSpacy")];
        let smoothed = vec![Span::new(11, 15, "CITY", 0.7, "IsraeliCityRecognizer")];

        let out = apply_city_country(&consolidated, &smoothed, &text, &tables);
        assert_eq!(bounds(&out), vec![(0, 21, "LOC")]);
    }

    #[test]
    fn test_city_replaces_preposition_loc() {
        // LOC "בחיפה" vs CITY "חיפה": the LOC keeps only the preposition,
        // which is then dropped as a scrap
        let tables = Tables::builtin().unwrap();
        let text = DocText::new("גר בחיפה");
        let consolidated = vec![Span::new(3, 8, "LOC", 0.8, "HebSpacy")];
        let smoothed = vec![Span::new(4, 8, "CITY", 0.7, "IsraeliCityRecognizer")];

        let out = apply_city_country(&consolidated, &smoothed, &text, &tables);
        assert_eq!(bounds(&out), vec![(4, 8, "CITY")]);
    }

    #[test]
    fn test_person_beats_city() {
        // "שרון לוי": a person name that also reads as a city
        let tables = Tables::builtin().unwrap();
        let text = DocText::new("שרון לוי הגיע");
        let consolidated = vec![Span::new(0, 8, "PERS", 0.9, "HebSpacy")];
        let smoothed = vec![Span::new(0, 4, "CITY", 0.7, "IsraeliCityRecognizer")];

        let out = apply_city_country(&consolidated, &smoothed, &text, &tables);
        assert_eq!(bounds(&out), vec![(0, 8, "PERS")]);
    }

    #[test]
    fn test_loc_trimmed_to_person_edge() {
        let tables = Tables::builtin().unwrap();
        let text = DocText::new("אבגדהוזחטי");
        let spans = vec![
            Span::new(0, 10, "LOC", 0.8, "HebSpacy"),
            Span::new(5, 10, "PERS", 0.9, "HebSpacy"),
        ];

        let out = trim_by_priority(spans, &text, &tables);
        assert_eq!(bounds(&out), vec![(0, 5, "LOC"), (5, 10, "PERS")]);
    }

    #[test]
    fn test_lower_priority_tail_moves_past_winner() {
        // CITY first, overlapping LOC after it: the LOC start moves to the
        // CITY end
        let tables = Tables::builtin().unwrap();
        let text = DocText::new("אבגדהוזחטי");
        let spans = vec![
            Span::new(0, 6, "CITY", 0.7, "IsraeliCityRecognizer"),
            Span::new(3, 10, "LOC", 0.8, "HebSpacy"),
        ];

        let out = trim_by_priority(spans, &text, &tables);
        assert_eq!(bounds(&out), vec![(0, 6, "CITY"), (6, 10, "LOC")]);
    }
}
