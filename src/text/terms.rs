//! Whole-word phrase search over Hebrew text.
//!
//! Hebrew attaches one-letter prepositions ("ב", "ל", "מ", ...) directly to the
//! following word, so a phrase may also start right after such a letter when
//! that letter itself starts a word.

use aho_corasick::{AhoCorasick, BuildError};

use super::{is_word_char, DocText};

/// A phrase occurrence in char offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermMatch {
    pub start: usize,
    pub len: usize,
}

impl TermMatch {
    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Offset of the last matched char
    pub fn last(&self) -> usize {
        self.end() - 1
    }
}

/// Multi-phrase matcher (Aho-Corasick, overlapping matches)
#[derive(Debug, Clone)]
pub struct TermsMatcher {
    automaton: AhoCorasick,
    phrases: Vec<String>,
}

impl TermsMatcher {
    /// Build a matcher; empty phrases are ignored
    pub fn new<I, S>(phrases: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let automaton = AhoCorasick::new(&phrases)?;
        Ok(Self { automaton, phrases })
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Find whole-word phrase occurrences, sorted and deduplicated.
    ///
    /// Single-character matches are skipped. With `prefixes`, a match may
    /// also begin right after a word-initial prefix letter.
    pub fn find(&self, text: &DocText, prefixes: &[char]) -> Vec<TermMatch> {
        if self.phrases.is_empty() {
            return Vec::new();
        }

        let total = text.char_len();
        let mut matches: Vec<TermMatch> = self
            .automaton
            .find_overlapping_iter(text.as_str())
            .filter_map(|m| {
                let start = text.char_offset(m.start());
                let end = text.char_offset(m.end());
                let len = end - start;
                if len <= 1 {
                    return None;
                }
                let starts_word = start_boundary(text, start, prefixes);
                let ends_word = end == total || text.char_at(end).is_some_and(|c| !is_word_char(c));
                (starts_word && ends_word).then_some(TermMatch { start, len })
            })
            .collect();

        matches.sort();
        matches.dedup();
        matches
    }

    /// Offsets of the last char of every occurrence
    pub fn end_offsets(&self, text: &DocText, prefixes: &[char]) -> Vec<usize> {
        self.find(text, prefixes).iter().map(TermMatch::last).collect()
    }
}

fn start_boundary(text: &DocText, start: usize, prefixes: &[char]) -> bool {
    if start == 0 {
        return true;
    }
    let before = match text.char_at(start - 1) {
        Some(c) => c,
        None => return false,
    };
    if !is_word_char(before) {
        return true;
    }
    if !prefixes.contains(&before) {
        return false;
    }
    // Prefix letter must itself begin a word
    start == 1 || text.char_at(start - 2).is_some_and(|c| !is_word_char(c))
}
