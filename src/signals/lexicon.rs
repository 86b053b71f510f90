//! Lexicon-based recognizer (cities, countries, medical terms).

use aho_corasick::BuildError;

use crate::domain::Span;
use crate::text::{DocText, TermsMatcher};

use super::Recognizer;

/// Confidence assigned to every lexicon match
pub const LEXICON_SCORE: f64 = 0.7;

/// Emits a span of one entity type for every lexicon phrase occurrence
#[derive(Debug, Clone)]
pub struct LexiconRecognizer {
    name: String,
    entity_type: String,
    matcher: TermsMatcher,
    prepositions: Vec<char>,
}

impl LexiconRecognizer {
    /// Build a recognizer. `prepositions` are one-letter prefixes allowed
    /// directly before a phrase; they are not part of the span.
    pub fn new<I, S>(
        name: impl Into<String>,
        entity_type: impl Into<String>,
        phrases: I,
        prepositions: Vec<char>,
    ) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            name: name.into(),
            entity_type: entity_type.into(),
            matcher: TermsMatcher::new(phrases)?,
            prepositions,
        })
    }
}

impl Recognizer for LexiconRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn analyze(&self, text: &DocText) -> Vec<Span> {
        self.matcher
            .find(text, &self.prepositions)
            .into_iter()
            .map(|m| {
                Span::new(m.start, m.end(), &self.entity_type, LEXICON_SCORE, &self.name)
                    .with_explanation(format!("lexicon match in {}", self.name))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_with_preposition() {
        let recognizer = LexiconRecognizer::new(
            "IsraeliCityRecognizer",
            "CITY",
            ["חיפה", "תל אביב"],
            vec!['ב', 'ל', 'מ'],
        )
        .unwrap();

        let text = DocText::new("נסע מחיפה לתל אביב");
        let spans = recognizer.analyze(&text);

        assert_eq!(spans.len(), 2);
        assert_eq!(text.slice(spans[0].start, spans[0].end), "חיפה");
        assert_eq!(text.slice(spans[1].start, spans[1].end), "תל אביב");
        assert!(spans.iter().all(|s| s.entity_type == "CITY"));
        assert!(spans.iter().all(|s| s.score == LEXICON_SCORE));
        assert_eq!(spans[0].recognizer, "IsraeliCityRecognizer");
    }

    #[test]
    fn test_no_partial_words() {
        let recognizer =
            LexiconRecognizer::new("DiseaseRecognizer", "DISEASE", ["שפעת"], vec![]).unwrap();
        assert!(recognizer.analyze(&DocText::new("שפעתי")).is_empty());
    }
}
