//! Date masking operators.
//!
//! Birth dates keep as much as the patient's age allows: the day is always
//! masked, the month is kept only for infants, and the year is masked only
//! for patients aged 89 or more. Medical dates lose only the day.

use chrono::{Datelike, NaiveDate};

use crate::text::{extract_date_components, DateMention};

use super::MaskSettings;

/// Age assumed when the date cannot be read numerically
const DEFAULT_AGE_DAYS: i64 = 50 * 365;

const DAYS_PER_YEAR: f64 = 365.0;

/// `replace_day_month`
pub fn mask_birth_date(text: &str, masks: &MaskSettings, today: NaiveDate) -> String {
    let mut mention = extract_date_components(text);
    if mention.is_empty() {
        return text.to_string();
    }

    let age_days = estimated_age_days(&mention, today);
    let above_89 = age_days as f64 / DAYS_PER_YEAR >= 89.0;
    let under_one_year = age_days < 365;

    if let Some(day) = mention.day.as_mut().filter(|c| !c.value.is_empty()) {
        day.value = masks.day_mask.clone();
    }
    if !under_one_year {
        if let Some(month) = mention.month.as_mut().filter(|c| !c.value.is_empty()) {
            month.value = masks.month_mask.clone();
        }
    }
    if above_89 {
        if let Some(year) = mention.year.as_mut().filter(|c| !c.value.is_empty()) {
            year.value = masks.year_mask.clone();
        }
    }
    mention.reconstruct()
}

/// `replace_only_day`
pub fn mask_medical_date(text: &str, masks: &MaskSettings) -> String {
    let mut mention = extract_date_components(text);
    if mention.is_empty() {
        return text.to_string();
    }
    if let Some(day) = mention.day.as_mut().filter(|c| !c.value.is_empty()) {
        day.value = masks.day_mask.clone();
    }
    mention.reconstruct()
}

/// Days between the birth date and `today`.
///
/// Only fully numeric day/month/year dates are read; anything else assumes
/// a 50 year old patient. Two-digit years belong to the current century
/// unless that would put them in the future.
pub fn estimated_age_days(mention: &DateMention, today: NaiveDate) -> i64 {
    birth_date(mention, today)
        .map(|birth| (today - birth).num_days())
        .unwrap_or(DEFAULT_AGE_DAYS)
}

fn birth_date(mention: &DateMention, today: NaiveDate) -> Option<NaiveDate> {
    let (day, month, year) = (
        mention.day.as_ref()?,
        mention.month.as_ref()?,
        mention.year.as_ref()?,
    );
    if !(day.is_numeric() && month.is_numeric() && year.is_numeric()) {
        return None;
    }

    let parsed_year: i32 = year.value.parse().ok()?;
    let full_year = if year.value.len() == 4 {
        parsed_year
    } else {
        let century = today.year() / 100 * 100;
        if parsed_year <= today.year() % 100 {
            century + parsed_year
        } else {
            century - 100 + parsed_year
        }
    };

    NaiveDate::from_ymd_opt(full_year, month.value.parse().ok()?, day.value.parse().ok()?)
}
