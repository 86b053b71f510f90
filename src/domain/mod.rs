//! Domain types for the de-identification pipeline.
//!
//! This module contains the core data structures:
//! - Span: a typed character interval produced by a recognizer
//! - Category: coarse grouping of entity types used for conflict classification
//! - Document: one request document and the span list of every stage

pub mod category;
pub mod document;
pub mod span;

// Re-export commonly used types
pub use category::{Category, CategoryMap};
pub use document::{AnonymizedText, Document, MaskedItem};
pub use span::{sort_by_offsets, Span};
