//! Core processing logic.
//!
//! This module contains:
//! - Tables: compiled, immutable lookup tables shared by every stage
//! - Pipeline: the per-document stage driver
//! - Validate: span contract checks between stages
//! - Limits: request size limits

pub mod limits;
pub mod pipeline;
pub mod tables;
pub mod validate;

// Re-export commonly used types
pub use limits::{LimitViolation, Limits};
pub use pipeline::{DocInput, Pipeline, PipelineError};
pub use tables::{TableError, TableSettings, Tables};
pub use validate::{validate_bounds, validate_disjoint, SpanContractViolation};
