//! Consolidation Integration Tests
//!
//! Properties of the consolidator over whole documents.

use hebsafeharbor::identifier::consolidate;
use hebsafeharbor::text::DocText;
use hebsafeharbor::{Span, Tables};

const TEXT: &str = "גדעון לבנה גר בתל אביב ועובד בבית החולים שערי צדק בירושלים";

fn tables() -> Tables {
    Tables::builtin().unwrap()
}

fn assert_disjoint(spans: &[Span]) {
    for pair in spans.windows(2) {
        assert!(
            pair[0].end <= pair[1].start,
            "overlap: {:?} and {:?}",
            pair[0],
            pair[1]
        );
    }
}

/// Small deterministic generator so failures are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

#[test]
fn test_output_never_overlaps() {
    let tables = tables();
    let text = DocText::new(TEXT);
    let len = text.char_len();
    let types = ["PERS", "LOC", "GPE", "ORG", "FAC", "DATE", "ISRAELI_ID_NUMBER", "PHONE_NUMBER"];
    let recognizers = ["HebSpacy", "SpacyRecognizerWithConfidence", "Other"];
    let mut rng = Lcg(7);

    for _ in 0..300 {
        let count = 1 + rng.next(12);
        let spans: Vec<Span> = (0..count)
            .map(|_| {
                let start = rng.next(len - 1);
                let end = start + 1 + rng.next(len - start);
                Span::new(
                    start,
                    end.min(len),
                    types[rng.next(types.len())],
                    0.5,
                    recognizers[rng.next(recognizers.len())],
                )
            })
            .collect();

        let out = consolidate(&spans, &text, &tables);
        assert_disjoint(&out);
        assert!(out.iter().all(|s| s.start < s.end && s.end <= len));
    }
}

#[test]
fn test_realistic_document_is_disjoint() {
    let tables = tables();
    let spans = vec![
        Span::new(0, 10, "PERS", 0.9, "HebSpacy"),
        Span::new(0, 5, "PERS", 0.6, "SpacyRecognizerWithConfidence"),
        Span::new(14, 22, "LOC", 0.8, "HebSpacy"),
        Span::new(15, 22, "GPE", 0.7, "SpacyRecognizerWithConfidence"),
        Span::new(30, 49, "ORG", 0.8, "HebSpacy"),
        Span::new(41, 49, "LOC", 0.6, "SpacyRecognizerWithConfidence"),
        Span::new(50, 58, "LOC", 0.9, "HebSpacy"),
    ];

    let out = consolidate(&spans, &DocText::new(TEXT), &tables);
    assert_disjoint(&out);

    let boundaries: Vec<(usize, usize)> = out.iter().map(Span::boundaries).collect();
    assert_eq!(boundaries, vec![(0, 10), (14, 22), (30, 49), (50, 58)]);
}

#[test]
fn test_single_span_preserved_unchanged() {
    let tables = tables();
    let span = Span::new(0, 10, "PERS", 0.9, "HebSpacy").with_explanation("model");

    let out = consolidate(&[span.clone()], &DocText::new(TEXT), &tables);
    assert_eq!(out, vec![span]);
}

#[test]
fn test_single_acronym_and_one_char_dropped() {
    let tables = tables();
    let text = DocText::new("בדיקת CBC ו א");
    let spans = vec![
        Span::new(6, 9, "ORG", 0.6, "HebSpacy"),
        Span::new(12, 13, "PERS", 0.6, "HebSpacy"),
    ];
    assert!(consolidate(&spans, &text, &tables).is_empty());
}

#[test]
fn test_deterministic() {
    let tables = tables();
    let text = DocText::new(TEXT);
    let spans = vec![
        Span::new(0, 10, "PERS", 0.9, "HebSpacy"),
        Span::new(5, 13, "LOC", 0.9, "HebSpacy"),
        Span::new(5, 13, "ORG", 0.9, "SpacyRecognizerWithConfidence"),
        Span::new(30, 49, "ORG", 0.8, "HebSpacy"),
        Span::new(30, 49, "LOC", 0.8, "SpacyRecognizerWithConfidence"),
    ];

    let first = consolidate(&spans, &text, &tables);
    let second = consolidate(&spans, &text, &tables);
    assert_eq!(first, second);
}

#[test]
fn test_exact_match_reduces_to_one() {
    let tables = tables();
    let spans = vec![
        Span::new(14, 22, "LOC", 0.8, "HebSpacy"),
        Span::new(14, 22, "GPE", 0.6, "SpacyRecognizerWithConfidence"),
    ];

    let out = consolidate(&spans, &DocText::new(TEXT), &tables);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].boundaries(), (14, 22));
}

#[test]
fn test_same_category_longest_wins() {
    let tables = tables();
    let spans = vec![
        Span::new(0, 5, "LOC", 0.9, "HebSpacy"),
        Span::new(0, 8, "LOC", 0.9, "HebSpacy"),
    ];

    let out = consolidate(&spans, &DocText::new(TEXT), &tables);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].boundaries(), (0, 8));
    assert_eq!(out[0].entity_type, "LOC");
}

#[test]
fn test_id_contact_resolved_by_context() {
    let tables = tables();
    let text = DocText::new("תעודה 123456789 טלפון");
    let spans = vec![
        Span::new(6, 15, "PHONE_NUMBER", 0.5, "PhoneRecognizer"),
        Span::new(6, 15, "ISRAELI_ID_NUMBER", 0.6, "IsraeliIdNumberRecognizer"),
    ];

    let out = consolidate(&spans, &text, &tables);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].entity_type, "ISRAELI_ID_NUMBER");
}

#[test]
fn test_contact_context_wins_over_id() {
    let tables = tables();
    let text = DocText::new("טלפון 123456789");
    let spans = vec![
        Span::new(6, 15, "ISRAELI_ID_NUMBER", 0.6, "IsraeliIdNumberRecognizer"),
        Span::new(6, 15, "PHONE_NUMBER", 0.5, "PhoneRecognizer"),
    ];

    let out = consolidate(&spans, &text, &tables);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].entity_type, "PHONE_NUMBER");
}

#[test]
fn test_mixed_prefers_longest() {
    let tables = tables();
    let spans = vec![
        Span::new(30, 49, "ORG", 0.8, "HebSpacy"),
        Span::new(41, 49, "PERS", 0.9, "HebSpacy"),
    ];

    let out = consolidate(&spans, &DocText::new(TEXT), &tables);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].entity_type, "ORG");
}
