//! Anonymizer: replaces every final span with its mask.
//!
//! Operators by entity type:
//! - BIRTH_DATE: `replace_day_month`
//! - MEDICAL_DATE: `replace_only_day`
//! - COUNTRY: `replace_by_region`
//! - CITY: `replace_cities_under_2k`
//! - everything else: `replace_in_hebrew` (category mask)

pub mod dates;

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::tables::Tables;
use crate::domain::{AnonymizedText, Category, MaskedItem, Span};
use crate::text::DocText;

pub use dates::{estimated_age_days, mask_birth_date, mask_medical_date};

/// Mask strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskSettings {
    /// Category -> replacement for `replace_in_hebrew`
    #[serde(default = "default_category_masks")]
    pub category_masks: BTreeMap<Category, String>,

    #[serde(default = "default_day_mask")]
    pub day_mask: String,

    #[serde(default = "default_month_mask")]
    pub month_mask: String,

    #[serde(default = "default_year_mask")]
    pub year_mask: String,

    /// Countries missing from the region map
    #[serde(default = "default_country_mask")]
    pub country_mask: String,

    /// Cities missing from the large-city allowlist
    #[serde(default = "default_city_mask")]
    pub city_mask: String,
}

fn default_category_masks() -> BTreeMap<Category, String> {
    [
        (Category::Name, "<שם_>"),
        (Category::Location, "<מיקום_>"),
        (Category::Org, "<ארגון_>"),
        (Category::Id, "<מזהה_>"),
        (Category::Contact, "<קשר_>"),
        (Category::Date, "<תאריך_>"),
    ]
    .into_iter()
    .map(|(category, mask)| (category, mask.to_string()))
    .collect()
}

fn default_day_mask() -> String {
    "<יום_>".to_string()
}
fn default_month_mask() -> String {
    "<חודש_>".to_string()
}
fn default_year_mask() -> String {
    "<שנה_>".to_string()
}
fn default_country_mask() -> String {
    "<מדינה_>".to_string()
}
fn default_city_mask() -> String {
    "<מיקום_>".to_string()
}

impl Default for MaskSettings {
    fn default() -> Self {
        Self {
            category_masks: default_category_masks(),
            day_mask: default_day_mask(),
            month_mask: default_month_mask(),
            year_mask: default_year_mask(),
            country_mask: default_country_mask(),
            city_mask: default_city_mask(),
        }
    }
}

/// Masking operator for one span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    ReplaceInHebrew,
    ReplaceDayMonth,
    ReplaceOnlyDay,
    ReplaceByRegion,
    ReplaceCitiesUnder2k,
}

impl Operator {
    pub fn for_entity(entity_type: &str) -> Self {
        match entity_type {
            "BIRTH_DATE" => Operator::ReplaceDayMonth,
            "MEDICAL_DATE" => Operator::ReplaceOnlyDay,
            "COUNTRY" => Operator::ReplaceByRegion,
            "CITY" => Operator::ReplaceCitiesUnder2k,
            _ => Operator::ReplaceInHebrew,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operator::ReplaceInHebrew => "replace_in_hebrew",
            Operator::ReplaceDayMonth => "replace_day_month",
            Operator::ReplaceOnlyDay => "replace_only_day",
            Operator::ReplaceByRegion => "replace_by_region",
            Operator::ReplaceCitiesUnder2k => "replace_cities_under_2k",
        }
    }
}

/// Masks final spans
#[derive(Debug, Clone, Default)]
pub struct Anonymizer {
    masks: MaskSettings,
    large_cities: BTreeSet<String>,
    country_regions: BTreeMap<String, String>,
}

impl Anonymizer {
    pub fn new(
        masks: MaskSettings,
        large_cities: BTreeSet<String>,
        country_regions: BTreeMap<String, String>,
    ) -> Self {
        Self {
            masks,
            large_cities,
            country_regions,
        }
    }

    /// Mask for one span's covered text
    pub fn mask_for(&self, span: &Span, covered: &str, tables: &Tables, today: NaiveDate) -> (String, Operator) {
        let operator = Operator::for_entity(&span.entity_type);
        let mask = match operator {
            Operator::ReplaceDayMonth => mask_birth_date(covered, &self.masks, today),
            Operator::ReplaceOnlyDay => mask_medical_date(covered, &self.masks),
            Operator::ReplaceByRegion => self
                .country_regions
                .get(covered)
                .cloned()
                .unwrap_or_else(|| self.masks.country_mask.clone()),
            Operator::ReplaceCitiesUnder2k => {
                if self.large_cities.contains(covered) {
                    covered.to_string()
                } else {
                    self.masks.city_mask.clone()
                }
            }
            Operator::ReplaceInHebrew => self
                .masks
                .category_masks
                .get(&tables.category(span))
                .cloned()
                .unwrap_or_else(|| format!("<{}>", span.entity_type)),
        };
        (mask, operator)
    }

    /// Replace non-overlapping, start-sorted spans in the text
    pub fn anonymize(&self, text: &DocText, spans: &[Span], tables: &Tables, today: NaiveDate) -> AnonymizedText {
        let mut out = String::with_capacity(text.as_str().len());
        let mut out_chars = 0;
        let mut cursor = 0;
        let mut items = Vec::with_capacity(spans.len());

        for span in spans {
            let between = text.slice(cursor, span.start);
            out.push_str(between);
            out_chars += between.chars().count();

            let covered = text.slice(span.start, span.end);
            let (mask, operator) = self.mask_for(span, covered, tables, today);
            let mask_len = mask.chars().count();
            out.push_str(&mask);

            items.push(MaskedItem {
                span: span.clone(),
                mask,
                mask_start: out_chars,
                mask_end: out_chars + mask_len,
                operator: operator.name().to_string(),
            });
            out_chars += mask_len;
            cursor = span.end;
        }
        out.push_str(text.slice(cursor, text.char_len()));

        AnonymizedText { text: out, items }
    }
}
