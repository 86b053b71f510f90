//! Read-only lookup tables shared by every pipeline stage.
//!
//! `TableSettings` is the serializable form (YAML config section `tables`).
//! `Tables` is the compiled form: trigger-phrase automata and filter
//! patterns built once at startup and shared through `Arc`.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Category, CategoryMap, Span};
use crate::text::TermsMatcher;

/// Errors while compiling tables
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to build phrase matcher: {0}")]
    Matcher(#[from] aho_corasick::BuildError),

    #[error("Failed to compile pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Context window sizes, in characters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Windows {
    /// ID / CONTACT trigger lookback (default: 5)
    #[serde(default = "default_context_window")]
    pub context: usize,

    /// Medical trigger lookback (default: 15)
    #[serde(default = "default_medical_window")]
    pub medical_context: usize,

    /// Healthcare title lookback (default: 5)
    #[serde(default = "default_title_window")]
    pub healthcare_title: usize,

    /// Birth phrase lookback, exclusive (default: 10)
    #[serde(default = "default_birth_window")]
    pub birth_context: usize,
}

fn default_context_window() -> usize {
    5
}
fn default_medical_window() -> usize {
    15
}
fn default_title_window() -> usize {
    5
}
fn default_birth_window() -> usize {
    10
}

impl Default for Windows {
    fn default() -> Self {
        Self {
            context: default_context_window(),
            medical_context: default_medical_window(),
            healthcare_title: default_title_window(),
            birth_context: default_birth_window(),
        }
    }
}

/// Location merge rule settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmootherSettings {
    /// Only spans from this recognizer take part
    #[serde(default = "default_smoother_recognizer")]
    pub recognizer: String,

    /// Entity types whose pairs may be merged
    #[serde(default = "default_merge_types")]
    pub merge_types: BTreeSet<String>,

    /// Maximum characters between the two spans
    #[serde(default = "default_max_gap")]
    pub max_gap: usize,
}

fn default_smoother_recognizer() -> String {
    "HebSpacy".to_string()
}
fn default_merge_types() -> BTreeSet<String> {
    strings(&["LOC"]).into_iter().collect()
}
fn default_max_gap() -> usize {
    5
}

impl Default for SmootherSettings {
    fn default() -> Self {
        Self {
            recognizer: default_smoother_recognizer(),
            merge_types: default_merge_types(),
            max_gap: default_max_gap(),
        }
    }
}

/// Serializable table contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    /// Entity type -> category mapping
    #[serde(default)]
    pub categories: CategoryMap,

    /// Types dropped before consolidation
    #[serde(default = "default_ignored_types")]
    pub ignored_types: BTreeSet<String>,

    /// Types held back for the post-consolidation rules
    #[serde(default = "default_postprocessed_types")]
    pub postprocessed_types: BTreeSet<String>,

    /// Recognizers that count as the generic statistical NER signal
    #[serde(default = "default_statistical_recognizers")]
    pub statistical_recognizers: BTreeSet<String>,

    #[serde(default)]
    pub smoother: SmootherSettings,

    /// Category trigger phrases (ID, CONTACT, MEDICAL)
    #[serde(default = "default_context_phrases")]
    pub context_phrases: BTreeMap<Category, Vec<String>>,

    #[serde(default = "default_healthcare_titles")]
    pub healthcare_titles: Vec<String>,

    #[serde(default = "default_birth_context")]
    pub birth_context: Vec<String>,

    /// One-letter prefixes allowed before location names
    #[serde(default = "default_prepositions")]
    pub location_prepositions: Vec<char>,

    /// One-letter prefixes allowed before medical terms and titles
    #[serde(default = "default_prepositions")]
    pub medical_prepositions: Vec<char>,

    /// One-letter prefixes allowed before filtered date forms
    #[serde(default = "default_date_prepositions")]
    pub date_prepositions: Vec<char>,

    #[serde(default = "default_weekdays")]
    pub weekdays: Vec<String>,

    #[serde(default = "default_seasons")]
    pub seasons: Vec<String>,

    #[serde(default)]
    pub windows: Windows,

    /// NAME spans after this fraction of the text need a title (default: 0.2)
    #[serde(default = "default_name_position_ratio")]
    pub name_position_ratio: f64,

    /// Minimum score for CITY / COUNTRY candidates (default: 0.5)
    #[serde(default = "default_min_location_score")]
    pub min_location_score: f64,

    /// Split MIXED groups of one nested span into two pieces (default: off)
    #[serde(default)]
    pub split_nested_mixed: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_ignored_types() -> BTreeSet<String> {
    strings(&["MONEY", "PERCENT", "MISC__ENT", "MISC_EVENT", "WOA", "EVE", "DUC", "ANG"])
        .into_iter()
        .collect()
}

fn default_postprocessed_types() -> BTreeSet<String> {
    strings(&["COUNTRY", "CITY", "DISEASE", "MEDICATION", "MEDICAL_TEST"])
        .into_iter()
        .collect()
}

fn default_statistical_recognizers() -> BTreeSet<String> {
    strings(&["HebSpacy", "SpacyRecognizerWithConfidence"])
        .into_iter()
        .collect()
}

fn default_context_phrases() -> BTreeMap<Category, Vec<String>> {
    let mut phrases = BTreeMap::new();
    phrases.insert(
        Category::Id,
        strings(&[
            "תעודה", "זהות", "מזהה", "רישיון", "מ.ר", "מ.ז", "ת.ז", "מספר אישי", "רשיון", "מנוי",
            "עובד", "רכב", "בנק", "אשראי",
        ]),
    );
    phrases.insert(
        Category::Contact,
        strings(&[
            "מיקוד", "בטלפון", "טלפון", "טלפון נייח", "טלפון נייד", "פלאפון", "פקס", "טלפון בבית",
            "טלפון בעבודה", "אימייל", "דואר אלקטרוני", "URL", "IP", "מייל",
        ]),
    );
    phrases.insert(
        Category::Medical,
        strings(&[
            "שילוב", "לשלב", "נשלב", "אבחנת עבודה", "שדרוג", "לשדרג", "שודרג", "הוספה", "נוסיף",
            "להוסיף", "נוסף", "הוספנו", "שינוי", "לשנות", "שונה", "שינינו", "מטופל", "מטופלת", "טופל",
            "טופלה", "טופל בחדר אחיות", "טופלה בחדר אחיות", "להתחיל", "יתחיל", "תתחיל", "נשלח",
            "נישלח", "יישלח", "גרורות", "סיכום", "החלפה", "להחליף", "הוחלף", "נחליף", "נוסה",
            "ניסינו", "ניסיון", "מניעה",
        ]),
    );
    phrases
}

fn default_healthcare_titles() -> Vec<String> {
    strings(&["ד\"ר", "דר", "דוקטור", "פרופסור", "פרופ'", "פרופ", "רופא"])
}

fn default_birth_context() -> Vec<String> {
    strings(&["נולד", "נולדה", "תאריך לידה", "ת.לידה"])
}

fn default_prepositions() -> Vec<char> {
    vec!['ב', 'ל', 'מ', 'ה', 'ו', 'ש']
}

fn default_date_prepositions() -> Vec<char> {
    vec!['ב', 'ל', 'מ', 'ה', 'ו']
}

fn default_weekdays() -> Vec<String> {
    strings(&["ראשון", "שני", "שלישי", "רביעי", "חמישי", "שישי", "שבת"])
}

fn default_seasons() -> Vec<String> {
    strings(&["אביב", "קיץ", "סתיו", "חורף"])
}

fn default_name_position_ratio() -> f64 {
    0.2
}

fn default_min_location_score() -> f64 {
    0.5
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            categories: CategoryMap::default(),
            ignored_types: default_ignored_types(),
            postprocessed_types: default_postprocessed_types(),
            statistical_recognizers: default_statistical_recognizers(),
            smoother: SmootherSettings::default(),
            context_phrases: default_context_phrases(),
            healthcare_titles: default_healthcare_titles(),
            birth_context: default_birth_context(),
            location_prepositions: default_prepositions(),
            medical_prepositions: default_prepositions(),
            date_prepositions: default_date_prepositions(),
            weekdays: default_weekdays(),
            seasons: default_seasons(),
            windows: Windows::default(),
            name_position_ratio: default_name_position_ratio(),
            min_location_score: default_min_location_score(),
            split_nested_mixed: false,
        }
    }
}

/// Fine types ordered strongest first for the city/country rule
const LOCATION_PRIORITY: &[&str] = &["PERS", "PER", "ORG", "FAC", "COUNTRY", "CITY", "LOC", "GPE"];

/// Compiled, immutable tables
#[derive(Debug, Clone)]
pub struct Tables {
    settings: TableSettings,
    context_matchers: BTreeMap<Category, TermsMatcher>,
    healthcare_titles: TermsMatcher,
    birth_context: TermsMatcher,
    partial_date: Regex,
    weekday: Regex,
    season: Regex,
    priority: Vec<String>,
}

impl Tables {
    /// Compile settings into matchers and patterns
    pub fn compile(settings: TableSettings) -> Result<Self, TableError> {
        let context_matchers = settings
            .context_phrases
            .iter()
            .map(|(category, phrases)| Ok((*category, TermsMatcher::new(phrases)?)))
            .collect::<Result<BTreeMap<_, _>, TableError>>()?;

        let prep = prefix_class(&settings.date_prepositions);
        let partial_date = Regex::new(&format!(r"^{prep}[0-9]{{1,4}}[/.\-][0-9]{{1,4}}$"))?;
        let weekday = Regex::new(&format!(
            r"^{prep}(?:יום\s+)?ה?(?:{})$",
            alternation(&settings.weekdays)
        ))?;
        let season = Regex::new(&format!(
            r"^{prep}ה?(?:{})$",
            alternation(&settings.seasons)
        ))?;

        let mut priority: Vec<String> = LOCATION_PRIORITY.iter().map(|s| s.to_string()).collect();
        priority.extend(
            settings
                .categories
                .entity_types()
                .into_iter()
                .filter(|t| !LOCATION_PRIORITY.contains(t))
                .map(str::to_string),
        );

        Ok(Self {
            healthcare_titles: TermsMatcher::new(&settings.healthcare_titles)?,
            birth_context: TermsMatcher::new(&settings.birth_context)?,
            context_matchers,
            partial_date,
            weekday,
            season,
            priority,
            settings,
        })
    }

    /// Compile the built-in settings
    pub fn builtin() -> Result<Self, TableError> {
        Self::compile(TableSettings::default())
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    pub fn windows(&self) -> &Windows {
        &self.settings.windows
    }

    pub fn category_of(&self, entity_type: &str) -> Category {
        self.settings.categories.category_of(entity_type)
    }

    /// Category of a span's entity type
    pub fn category(&self, span: &Span) -> Category {
        self.category_of(&span.entity_type)
    }

    pub fn is_ignored(&self, entity_type: &str) -> bool {
        self.settings.ignored_types.contains(entity_type)
    }

    pub fn is_postprocessed(&self, entity_type: &str) -> bool {
        self.settings.postprocessed_types.contains(entity_type)
    }

    /// Span produced by the generic statistical NER signal
    pub fn is_statistical(&self, span: &Span) -> bool {
        self.settings.statistical_recognizers.contains(&span.recognizer)
    }

    /// Trigger phrase matcher of a category, if any
    pub fn context_matcher(&self, category: Category) -> Option<&TermsMatcher> {
        self.context_matchers.get(&category)
    }

    pub fn healthcare_titles(&self) -> &TermsMatcher {
        &self.healthcare_titles
    }

    pub fn birth_context(&self) -> &TermsMatcher {
        &self.birth_context
    }

    /// Numeric date with only two components ("3/10", "ב-12.05")
    pub fn is_partial_date(&self, text: &str) -> bool {
        self.partial_date.is_match(text)
    }

    pub fn is_weekday(&self, text: &str) -> bool {
        self.weekday.is_match(text)
    }

    pub fn is_season(&self, text: &str) -> bool {
        self.season.is_match(text)
    }

    /// Rank in the city/country priority order (0 = strongest)
    pub fn priority_of(&self, entity_type: &str) -> usize {
        self.priority
            .iter()
            .position(|t| t == entity_type)
            .unwrap_or(self.priority.len())
    }
}


fn prefix_class(prefixes: &[char]) -> String {
    if prefixes.is_empty() {
        return String::new();
    }
    let class: String = prefixes
        .iter()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    format!("[{class}]?")
}

fn alternation(words: &[String]) -> String {
    if words.is_empty() {
        // Never matches
        return r"\b\B".to_string();
    }
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}
