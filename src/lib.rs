//! hebsafeharbor - De-identification of Hebrew clinical text
//!
//! Finds protected health information (names, locations, organizations,
//! dates, identifiers, contact details) in Hebrew free text and replaces it
//! with category masks.
//!
//! # Architecture
//!
//! Several recognizers tag the same text independently and disagree. The
//! identifier stages turn their overlapping output into one
//! non-overlapping, typed span list:
//! - Smoother merges recognizer artifacts
//! - Filter drops spans that must not take part in conflict resolution
//! - Consolidator resolves every overlap group by its conflict case
//! - Post-consolidation rules re-check locations and medical terms
//! - Splitter refines dates into birth dates and medical dates
//!
//! The anonymizer then masks each span.
//!
//! # Modules
//!
//! - `domain`: Data structures (Span, Category, Document)
//! - `text`: Character-offset text view and phrase matching
//! - `signals`: Recognizers (lexicons, Israeli ID, statistical model boundary)
//! - `identifier`: The identification stages
//! - `core`: Tables, pipeline driver, span contract checks
//! - `anonymizer`: Mask operators
//! - `service`: Readiness-gated batch service and wire types
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Mask a batch of documents
//! echo '{"docs": [{"id": "1", "text": "..."}]}' | hsh run
//!
//! # Inspect every stage's spans
//! hsh identify --input docs.json
//! ```

pub mod anonymizer;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod identifier;
pub mod service;
pub mod signals;
pub mod text;

// Re-export main types at crate root for convenience
pub use core::{DocInput, Pipeline, PipelineError, Tables};
pub use domain::{Category, Document, Span};
pub use service::{SafeHarborService, ServiceError, ServiceStatus};
