//! Request size limits.
//!
//! Prevents oversized requests from monopolizing the process:
//! - Characters per document
//! - Documents per batch

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits applied to every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum document length in characters (default: 1,000,000)
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Maximum documents per batch (default: 1000)
    #[serde(default = "default_max_docs")]
    pub max_docs: usize,
}

fn default_max_text_chars() -> usize {
    1_000_000
}
fn default_max_docs() -> usize {
    1000
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_text_chars: default_max_text_chars(),
            max_docs: default_max_docs(),
        }
    }
}

impl Limits {
    /// Validate one document's length
    pub fn validate_text(&self, doc_id: &str, char_len: usize) -> Result<(), LimitViolation> {
        if char_len > self.max_text_chars {
            return Err(LimitViolation::MaxTextChars {
                doc_id: doc_id.to_string(),
                actual: char_len,
                limit: self.max_text_chars,
            });
        }
        Ok(())
    }

    /// Validate batch size
    pub fn validate_batch(&self, docs: usize) -> Result<(), LimitViolation> {
        if docs > self.max_docs {
            return Err(LimitViolation::MaxDocs {
                actual: docs,
                limit: self.max_docs,
            });
        }
        Ok(())
    }
}

/// Limit violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitViolation {
    #[error("Document {doc_id} has {actual} characters (limit: {limit})")]
    MaxTextChars {
        doc_id: String,
        actual: usize,
        limit: usize,
    },

    #[error("Request has {actual} documents (limit: {limit})")]
    MaxDocs { actual: usize, limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = Limits::default();
        assert_eq!(limits.max_text_chars, 1_000_000);
        assert_eq!(limits.max_docs, 1000);
    }

    #[test]
    fn test_text_limit() {
        let limits = Limits {
            max_text_chars: 10,
            ..Default::default()
        };

        assert!(limits.validate_text("a", 10).is_ok());
        let err = limits.validate_text("a", 11).unwrap_err();
        assert_eq!(
            err,
            LimitViolation::MaxTextChars {
                doc_id: "a".to_string(),
                actual: 11,
                limit: 10
            }
        );
    }

    #[test]
    fn test_batch_limit() {
        let limits = Limits {
            max_docs: 2,
            ..Default::default()
        };
        assert!(limits.validate_batch(2).is_ok());
        assert!(matches!(
            limits.validate_batch(3),
            Err(LimitViolation::MaxDocs { actual: 3, limit: 2 })
        ));
    }
}
