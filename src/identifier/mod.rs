//! PHI identification stages.
//!
//! Each stage is a pure `&[Span] -> Vec<Span>` transformation over one
//! document text:
//! - `smoother`: merge recognizer artifacts
//! - `filter`: drop spans that must not take part in consolidation
//! - `consolidation`: resolve overlaps into a non-overlapping list, then
//!   apply the post-consolidation rules
//! - `splitter`: refine DATE into BIRTH_DATE / MEDICAL_DATE

pub mod consolidation;
pub mod filter;
pub mod smoother;
pub mod splitter;

pub use consolidation::post::{apply_city_country, apply_medical};
pub use consolidation::{consolidate, ConflictCase};
pub use filter::filter;
pub use smoother::smooth;
pub use splitter::{split_dates, BIRTH_DATE, MEDICAL_DATE};
