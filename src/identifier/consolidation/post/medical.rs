//! Medical false-positive rule.
//!
//! Disease and drug names are often tagged as person or organization names
//! by the statistical model. NAME / ORG spans are dropped when:
//! - a medical term covers them (exactly, behind a one-letter preposition,
//!   or by containment)
//! - a medical-context trigger phrase precedes them closely
//! - (NAME only) they appear past the document head without a healthcare
//!   title right before them

use tracing::debug;

use crate::core::tables::Tables;
use crate::domain::{Category, Span};
use crate::identifier::consolidation::resolver::has_preceding_trigger;
use crate::text::DocText;

use super::held_back;

/// Types re-admitted as evidence by this rule
pub const MEDICAL_TYPES: &[&str] = &["DISEASE", "MEDICATION", "MEDICAL_TEST"];

/// Drop NAME / ORG spans that are really medical mentions
pub fn apply_medical(
    consolidated: &[Span],
    smoothed: &[Span],
    text: &DocText,
    tables: &Tables,
) -> Vec<Span> {
    let prepositions = &tables.settings().medical_prepositions;
    let windows = tables.windows();
    let is_name_or_org = |span: &Span| matches!(tables.category(span), Category::Name | Category::Org);

    let medical: Vec<&Span> = held_back(smoothed, MEDICAL_TYPES).collect();
    let medical_triggers = tables
        .context_matcher(Category::Medical)
        .map(|matcher| matcher.end_offsets(text, prepositions))
        .unwrap_or_default();
    let titles = tables.healthcare_titles().end_offsets(text, prepositions);
    let name_threshold = (tables.settings().name_position_ratio * text.char_len() as f64).floor() as usize;

    let mut covered = 0;
    let mut by_context = 0;
    let mut late_names = 0;

    let kept: Vec<Span> = consolidated
        .iter()
        .filter(|&span| {
            if is_name_or_org(span) && medical.iter().any(|m| covers(m, span, text, prepositions)) {
                covered += 1;
                return false;
            }
            if is_name_or_org(span)
                && has_preceding_trigger(&medical_triggers, span.start, windows.medical_context)
            {
                by_context += 1;
                return false;
            }
            if tables.category(span) == Category::Name
                && span.start >= name_threshold
                && !has_preceding_trigger(&titles, span.start, windows.healthcare_title)
            {
                late_names += 1;
                return false;
            }
            true
        })
        .cloned()
        .collect();

    debug!(covered, by_context, late_names, output = kept.len(), "Applied medical rule");
    kept
}

/// Medical span covers the entity: containment, or same end with the entity
/// starting one preposition letter earlier
fn covers(medical: &Span, entity: &Span, text: &DocText, prepositions: &[char]) -> bool {
    if medical.contains(entity) {
        return true;
    }
    medical.end == entity.end
        && medical.start == entity.start + 1
        && text
            .char_at(entity.start)
            .is_some_and(|c| prepositions.contains(&c))
}
