//! Character-offset text utilities.
//!
//! Span offsets are character (Unicode scalar) indices, while `str` slicing
//! and regex matches work in bytes. `DocText` keeps the translation table.
//!
//! - `terms`: multi-phrase search with word-boundary and preposition rules
//! - `dates`: day / month / year component extraction

pub mod dates;
pub mod terms;

pub use dates::{extract_date_components, DateComponent, DateMention};
pub use terms::{TermMatch, TermsMatcher};

/// Immutable document text with char <-> byte offset translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocText {
    text: String,
    /// Byte offset of every char, plus the total byte length
    char_bytes: Vec<usize>,
}

impl DocText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut char_bytes: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        char_bytes.push(text.len());
        Self { text, char_bytes }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of characters
    pub fn char_len(&self) -> usize {
        self.char_bytes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset of a char offset (clamped to the text length)
    pub fn byte_offset(&self, char_offset: usize) -> usize {
        self.char_bytes[char_offset.min(self.char_len())]
    }

    /// Char offset of a byte offset that lies on a char boundary
    pub fn char_offset(&self, byte_offset: usize) -> usize {
        match self.char_bytes.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    /// Text between two char offsets (clamped)
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let start_byte = self.byte_offset(start);
        let end_byte = self.byte_offset(end.max(start));
        &self.text[start_byte..end_byte]
    }

    /// Char at a char offset
    pub fn char_at(&self, char_offset: usize) -> Option<char> {
        if char_offset >= self.char_len() {
            return None;
        }
        self.text[self.byte_offset(char_offset)..].chars().next()
    }
}

impl From<&str> for DocText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Word character in the regex `\w` sense (letters, digits, underscore)
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Hebrew letter in the range א-ת
pub fn is_hebrew_letter(c: char) -> bool {
    ('\u{05D0}'..='\u{05EA}').contains(&c)
}
