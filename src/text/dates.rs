//! Date component extraction for date masking.
//!
//! Recognizes Hebrew-calendar dates, Gregorian dates with Hebrew month names
//! and numeric dates (`/`, `.` or `-` separated). Component offsets are byte
//! offsets into the mention text.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Mentions shorter than this (in chars) are not treated as dates
pub const MIN_DATE_LENGTH: usize = 6;

const PREPOSITION: &str = r"(?:ב|ל|מ|מה|ה)";
const MONTH_PREPOSITION: &str = r"(?:ב|ל|בחודש|לחודש)";
const HEBREW_MONTHS: &[&str] = &[
    "אלול", "אב", "תמוז", "סיון", "סיוון", "אייר", "ניסן", "אדר", "שבט", "טבת", "כסלו", "כיסלו",
    "חשוון", "תשרי",
];
const HEBREW_DAYS: &[&str] = &["[א-ל]׳", "י״(?:[א-ד]|[ז-ט])", "ט״(?:ו|ז)", "כ״[א-ט]", "ל״א"];
const HEBREW_YEAR: &str = r"ה?ת[א-ת][א-ת]?״[א-ת]";
const LATIN_MONTHS: &[&str] = &[
    "ינואר", "פברואר", "מרץ", "אפריל", "מאי", "יוני", "יולי", "אוגוסט", "ספטמבר", "אוקטובר",
    "נובמבר", "דצמבר",
];
const NUMERIC_DAY: &str = r"[1-9]|0[1-9]|[1-2][0-9]|3[0-1]";

fn compile(pattern: String) -> Regex {
    Regex::new(&pattern).expect("date pattern should compile")
}

static HEBREW_FULL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    compile(format!(
        r"\b{PREPOSITION}?(?P<day>{days})\s+{MONTH_PREPOSITION}?(?:-|\s)?(?P<month>{months})(?:\s+|,\s+)(?P<year>{HEBREW_YEAR})\b",
        days = HEBREW_DAYS.join("|"),
        months = HEBREW_MONTHS.join("|"),
    ))
});

static HEBREW_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    compile(format!(
        r"\b{MONTH_PREPOSITION}?(?:-|\s)?(?P<month>{months})(?:\s+|,\s+)(?P<year>{HEBREW_YEAR})\b",
        months = HEBREW_MONTHS.join("|"),
    ))
});

static HEBREW_DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    compile(format!(
        r"\b{PREPOSITION}?(?P<day>{days})\s+{MONTH_PREPOSITION}?(?:-|\s)?(?P<month>{months})\b",
        days = HEBREW_DAYS.join("|"),
        months = HEBREW_MONTHS.join("|"),
    ))
});

static LATIN_DATE: LazyLock<Regex> = LazyLock::new(|| {
    compile(format!(
        r"\b{PREPOSITION}?(?P<day>{NUMERIC_DAY})?(?:\s+)?{MONTH_PREPOSITION}?(?:-|\s)?(?P<month>{months})(?:\s|,\s)?(?P<year>[0-9]{{4}}|[0-9]{{2}})?\b",
        months = LATIN_MONTHS.join("|"),
    ))
});

static NUMERIC_DATE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"([0-9]+)[/.\-]([0-9]+)(?:[/.\-]([0-9]+))?".to_string()));

/// One date component (day, month or year) inside a mention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateComponent {
    /// Current value; operators overwrite it with a mask
    pub value: String,
    /// Byte offset in the mention text
    pub start: usize,
    /// Exclusive byte offset in the mention text
    pub end: usize,
}

impl DateComponent {
    fn from_group(caps: &Captures<'_>, group: usize) -> Option<Self> {
        caps.get(group).map(|m| Self {
            value: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
    }

    fn from_name(caps: &Captures<'_>, name: &str) -> Option<Self> {
        caps.name(name).map(|m| Self {
            value: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
    }

    pub fn is_numeric(&self) -> bool {
        !self.value.is_empty() && self.value.chars().all(|c| c.is_ascii_digit())
    }
}

/// Date components found in a mention
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateMention {
    pub day: Option<DateComponent>,
    pub month: Option<DateComponent>,
    pub year: Option<DateComponent>,
    pub text: String,
}

impl DateMention {
    /// No component was recognized
    pub fn is_empty(&self) -> bool {
        self.day.is_none() && self.month.is_none() && self.year.is_none()
    }

    /// Rebuild the mention text with the (possibly masked) component values
    pub fn reconstruct(&self) -> String {
        let mut components: Vec<&DateComponent> =
            [&self.day, &self.month, &self.year].into_iter().flatten().collect();
        components.sort_by_key(|c| std::cmp::Reverse(c.start));

        let mut out = self.text.clone();
        for component in components {
            out.replace_range(component.start..component.end, &component.value);
        }
        out
    }
}

/// Extract day / month / year components from a recognized date text
pub fn extract_date_components(text: &str) -> DateMention {
    if text.chars().count() < MIN_DATE_LENGTH {
        return DateMention::default();
    }

    let named = |caps: Captures<'_>| DateMention {
        day: DateComponent::from_name(&caps, "day"),
        month: DateComponent::from_name(&caps, "month"),
        year: DateComponent::from_name(&caps, "year"),
        text: text.to_string(),
    };

    if let Some(caps) = HEBREW_FULL_DATE.captures(text) {
        return named(caps);
    }
    if let Some(caps) = HEBREW_MONTH_YEAR.captures(text) {
        return named(caps);
    }
    if let Some(caps) = HEBREW_DAY_MONTH.captures(text) {
        return named(caps);
    }
    if let Some(caps) = LATIN_DATE.captures(text) {
        return named(caps);
    }

    match NUMERIC_DATE.captures(text) {
        Some(caps) => numeric_mention(&caps, text),
        None => DateMention::default(),
    }
}

fn numeric_mention(caps: &Captures<'_>, text: &str) -> DateMention {
    let number = |group: usize| {
        caps.get(group)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(u64::MAX)
    };
    let component = |group: usize| DateComponent::from_group(caps, group);

    let (day, month, year) = if caps.get(3).is_none() {
        // month/year or year/month
        if number(1) > 12 {
            (None, component(2), component(1))
        } else {
            (None, component(1), component(2))
        }
    } else if number(1) > 31 {
        // year first
        if number(2) > 12 {
            (component(2), component(3), component(1))
        } else {
            (component(3), component(2), component(1))
        }
    } else if number(2) > 12 {
        (component(2), component(1), component(3))
    } else {
        (component(1), component(2), component(3))
    };

    DateMention {
        day,
        month,
        year,
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(mention: &DateMention) -> (Option<&str>, Option<&str>, Option<&str>) {
        (
            mention.day.as_ref().map(|c| c.value.as_str()),
            mention.month.as_ref().map(|c| c.value.as_str()),
            mention.year.as_ref().map(|c| c.value.as_str()),
        )
    }

    #[test]
    fn test_short_text_is_not_a_date() {
        assert!(extract_date_components("3/10").is_empty());
    }

    #[test]
    fn test_numeric_day_month_year() {
        let mention = extract_date_components("16.1.2022");
        assert_eq!(values(&mention), (Some("16"), Some("1"), Some("2022")));
    }

    #[test]
    fn test_numeric_month_day_year() {
        let mention = extract_date_components("1/16/2022");
        assert_eq!(values(&mention), (Some("16"), Some("1"), Some("2022")));
    }

    #[test]
    fn test_numeric_year_first() {
        let mention = extract_date_components("2022-01-16");
        assert_eq!(values(&mention), (Some("16"), Some("01"), Some("2022")));
    }

    #[test]
    fn test_numeric_month_year() {
        let mention = extract_date_components("ב-03/2021");
        assert_eq!(values(&mention), (None, Some("03"), Some("2021")));

        let mention = extract_date_components("2021/03");
        assert_eq!(values(&mention), (None, Some("03"), Some("2021")));
    }

    #[test]
    fn test_latin_month_name() {
        let mention = extract_date_components("5 בינואר 2020");
        assert_eq!(values(&mention), (Some("5"), Some("ינואר"), Some("2020")));
    }

    #[test]
    fn test_hebrew_calendar_date() {
        let mention = extract_date_components("ט״ו בשבט תשפ״ב");
        assert_eq!(values(&mention), (Some("ט״ו"), Some("שבט"), Some("תשפ״ב")));
    }

    #[test]
    fn test_reconstruct_with_masked_day() {
        let mut mention = extract_date_components("ב16.1.2022");
        if let Some(day) = mention.day.as_mut() {
            day.value = "<יום_>".to_string();
        }
        assert_eq!(mention.reconstruct(), "ב<יום_>.1.2022");
    }

    #[test]
    fn test_no_components() {
        assert!(extract_date_components("אתמול בערב").is_empty());
    }
}
