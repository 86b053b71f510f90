//! Israeli ID number recognizer with checksum validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::Span;
use crate::text::DocText;

use super::Recognizer;

pub const ISRAELI_ID_ENTITY: &str = "ISRAELI_ID_NUMBER";
pub const ISRAELI_ID_SCORE: f64 = 0.6;

static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{8}-[0-9]|[0-9]{9}|[0-9]{8}").expect("id pattern should compile")
});

/// 8 or 9 digit ID numbers, optionally with a dash before the check digit
#[derive(Debug, Clone, Default)]
pub struct IsraeliIdRecognizer;

impl Recognizer for IsraeliIdRecognizer {
    fn name(&self) -> &str {
        "IsraeliIdNumberRecognizer"
    }

    fn analyze(&self, text: &DocText) -> Vec<Span> {
        let haystack = text.as_str();
        ID_PATTERN
            .find_iter(haystack)
            .filter(|m| {
                let digit_before = haystack[..m.start()]
                    .chars()
                    .next_back()
                    .is_some_and(|c| c.is_ascii_digit());
                let digit_after = haystack[m.end()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit());
                !digit_before && !digit_after
            })
            .map(|m| {
                let start = text.char_offset(m.start());
                let end = text.char_offset(m.end());
                Span::new(start, end, ISRAELI_ID_ENTITY, ISRAELI_ID_SCORE, self.name())
                    .with_validation(is_valid_israeli_id(m.as_str()))
            })
            .collect()
    }
}

/// Israeli ID checksum (Luhn variant over 9 digits, zero-padded)
pub fn is_valid_israeli_id(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default();
    if digits.is_empty() || digits.len() > 9 {
        return false;
    }

    let padding = 9 - digits.len();
    let sum: u32 = std::iter::repeat(0)
        .take(padding)
        .chain(digits)
        .enumerate()
        .map(|(index, digit)| {
            let value = if index % 2 == 1 { digit * 2 } else { digit };
            if value > 9 {
                value - 9
            } else {
                value
            }
        })
        .sum();

    sum % 10 == 0
}
