//! Configuration for hebsafeharbor.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variable HSH_CONFIG (path to a config file)
//! 2. Config file (.hsh/config.yaml)
//! 3. User config file (~/.hsh/config.yaml)
//! 4. Built-in tables and lexicons
//!
//! Config file discovery:
//! - Searches current directory and parents for .hsh/config.yaml
//! - Lexicon file paths are relative to the config file's directory

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::anonymizer::{Anonymizer, MaskSettings};
use crate::core::{Limits, Pipeline, TableSettings, Tables};
use crate::signals::{IsraeliIdRecognizer, LexiconRecognizer, Recognizer};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "HSH_CONFIG";

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub tables: TableSettings,
    #[serde(default)]
    pub lexicons: LexiconConfig,
    #[serde(default)]
    pub anonymizer: MaskSettings,
    #[serde(default)]
    pub limits: Limits,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// A word list given inline or as a newline-delimited file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WordList {
    Inline(Vec<String>),
    File { path: String },
}

/// Country -> region mask, inline or as a YAML mapping file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionMap {
    File { path: String },
    Inline(BTreeMap<String, String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconConfig {
    #[serde(default = "default_cities")]
    pub cities: WordList,
    #[serde(default = "default_countries")]
    pub countries: WordList,
    #[serde(default = "default_diseases")]
    pub diseases: WordList,
    #[serde(default = "default_medications")]
    pub medications: WordList,
    #[serde(default = "default_medical_tests")]
    pub medical_tests: WordList,
    /// Cities left unmasked (population of 2,000 or more)
    #[serde(default = "default_large_cities")]
    pub large_cities: WordList,
    #[serde(default = "default_country_regions")]
    pub country_regions: RegionMap,
}

const LARGE_CITIES: &[&str] = &[
    "ירושלים", "תל אביב", "תל אביב-יפו", "יפו", "חיפה", "ראשון לציון", "פתח תקווה", "אשדוד",
    "נתניה", "באר שבע", "בני ברק", "חולון", "רמת גן", "אשקלון", "רחובות", "בת ים", "בית שמש",
    "כפר סבא", "הרצליה", "חדרה", "מודיעין", "נצרת", "לוד", "רמלה", "רעננה", "עפולה", "אילת",
    "טבריה", "צפת", "עכו", "נהריה", "קריית שמונה", "דימונה", "ערד", "ראש פינה", "זכרון יעקב",
];

const SMALL_CITIES: &[&str] = &["מטולה", "יסוד המעלה", "עין גדי", "נווה אטי\"ב", "כפר חרוב"];

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_cities() -> WordList {
    WordList::Inline(
        LARGE_CITIES
            .iter()
            .chain(SMALL_CITIES)
            .map(|s| s.to_string())
            .collect(),
    )
}

fn default_large_cities() -> WordList {
    WordList::Inline(words(LARGE_CITIES))
}

const COUNTRY_REGIONS: &[(&str, &str)] = &[
    ("ארצות הברית", "<צפון אמריקה_>"),
    ("קנדה", "<צפון אמריקה_>"),
    ("מקסיקו", "<מרכז אמריקה_>"),
    ("ברזיל", "<דרום אמריקה_>"),
    ("ארגנטינה", "<דרום אמריקה_>"),
    ("צרפת", "<אירופה_>"),
    ("גרמניה", "<אירופה_>"),
    ("איטליה", "<אירופה_>"),
    ("ספרד", "<אירופה_>"),
    ("בריטניה", "<אירופה_>"),
    ("אנגליה", "<אירופה_>"),
    ("פולין", "<אירופה_>"),
    ("רוסיה", "<אירופה_>"),
    ("אוקראינה", "<אירופה_>"),
    ("רומניה", "<אירופה_>"),
    ("מצרים", "<אפריקה_>"),
    ("מרוקו", "<אפריקה_>"),
    ("אתיופיה", "<אפריקה_>"),
    ("ירדן", "<המזרח התיכון_>"),
    ("לבנון", "<המזרח התיכון_>"),
    ("סוריה", "<המזרח התיכון_>"),
    ("טורקיה", "<המזרח התיכון_>"),
    ("עיראק", "<המזרח התיכון_>"),
    ("איראן", "<המזרח התיכון_>"),
    ("הודו", "<אסיה_>"),
    ("סין", "<אסיה_>"),
    ("יפן", "<אסיה_>"),
    ("תאילנד", "<אסיה_>"),
    ("אוסטרליה", "<אוקיאניה_>"),
];

fn default_countries() -> WordList {
    let mut countries: Vec<String> = COUNTRY_REGIONS.iter().map(|(c, _)| c.to_string()).collect();
    countries.push("ישראל".to_string());
    WordList::Inline(countries)
}

fn default_country_regions() -> RegionMap {
    RegionMap::Inline(
        COUNTRY_REGIONS
            .iter()
            .map(|(country, region)| (country.to_string(), region.to_string()))
            .collect(),
    )
}

fn default_diseases() -> WordList {
    WordList::Inline(words(&[
        "סוכרת", "יתר לחץ דם", "אסתמה", "דלקת ריאות", "שפעת", "אלצהיימר", "פרקינסון", "סרטן",
        "אפילפסיה", "אי ספיקת לב", "טרשת נפוצה", "קרוהן", "הפטיטיס", "אנמיה", "ברונכיטיס",
    ]))
}

fn default_medications() -> WordList {
    WordList::Inline(words(&[
        "אקמול", "נורופן", "אדוויל", "אופטלגין", "קרסטור", "ליפיטור", "אספירין", "אומפרדקס",
        "אוגמנטין", "מטפורמין", "אינסולין", "קומדין", "פרדניזון", "ונטולין", "אלטרואיד",
    ]))
}

fn default_medical_tests() -> WordList {
    WordList::Inline(words(&[
        "ספירת דם", "אק\"ג", "סי טי", "אולטרסאונד", "ביופסיה", "קולונוסקופיה", "גסטרוסקופיה",
        "אקו לב", "ממוגרפיה", "צילום חזה", "תפקודי ריאות", "MRI", "CT",
    ]))
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            cities: default_cities(),
            countries: default_countries(),
            diseases: default_diseases(),
            medications: default_medications(),
            medical_tests: default_medical_tests(),
            large_cities: default_large_cities(),
            country_regions: default_country_regions(),
        }
    }
}

/// Lexicons with every file reference loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lexicons {
    pub cities: Vec<String>,
    pub countries: Vec<String>,
    pub diseases: Vec<String>,
    pub medications: Vec<String>,
    pub medical_tests: Vec<String>,
    pub large_cities: BTreeSet<String>,
    pub country_regions: BTreeMap<String, String>,
}

impl LexiconConfig {
    /// Load file-backed lists relative to `base`
    pub fn resolve(&self, base: &Path) -> Result<Lexicons> {
        Ok(Lexicons {
            cities: load_word_list(base, &self.cities)?,
            countries: load_word_list(base, &self.countries)?,
            diseases: load_word_list(base, &self.diseases)?,
            medications: load_word_list(base, &self.medications)?,
            medical_tests: load_word_list(base, &self.medical_tests)?,
            large_cities: load_word_list(base, &self.large_cities)?.into_iter().collect(),
            country_regions: load_region_map(base, &self.country_regions)?,
        })
    }
}

fn load_word_list(base: &Path, list: &WordList) -> Result<Vec<String>> {
    match list {
        WordList::Inline(words) => Ok(words.clone()),
        WordList::File { path } => {
            let path = resolve_path(base, path);
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read word list: {}", path.display()))?;
            Ok(content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from)
                .collect())
        }
    }
}

fn load_region_map(base: &Path, map: &RegionMap) -> Result<BTreeMap<String, String>> {
    match map {
        RegionMap::Inline(regions) => Ok(regions.clone()),
        RegionMap::File { path } => {
            let path = resolve_path(base, path);
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read region map: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse region map: {}", path.display()))
        }
    }
}

/// Resolved configuration with every lexicon loaded
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub tables: TableSettings,
    pub lexicons: Lexicons,
    pub masks: MaskSettings,
    pub limits: Limits,
}

impl ResolvedConfig {
    /// Built-in tables and lexicons
    pub fn builtin() -> Result<Self> {
        Self::from_config_file(ConfigFile::default(), Path::new("."), None)
    }

    /// Load a config file
    pub fn from_path(path: &Path) -> Result<Self> {
        let config = load_config_file(path)?;
        let base = path.parent().unwrap_or(Path::new("."));
        Self::from_config_file(config, base, Some(path.to_path_buf()))
    }

    fn from_config_file(config: ConfigFile, base: &Path, config_file: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            config_file,
            lexicons: config.lexicons.resolve(base)?,
            tables: config.tables,
            masks: config.anonymizer,
            limits: config.limits,
        })
    }

    /// Compile the lookup tables
    pub fn compile_tables(&self) -> Result<Tables> {
        Tables::compile(self.tables.clone()).context("Failed to compile tables")
    }

    /// In-process recognizers: lexicons and the Israeli ID pattern
    pub fn recognizers(&self) -> Result<Vec<Arc<dyn Recognizer>>> {
        let location = &self.tables.location_prepositions;
        let medical = &self.tables.medical_prepositions;
        let lexicons = [
            ("IsraeliCityRecognizer", "CITY", &self.lexicons.cities, location),
            ("CountryRecognizer", "COUNTRY", &self.lexicons.countries, location),
            ("DiseaseRecognizer", "DISEASE", &self.lexicons.diseases, medical),
            ("MedicationRecognizer", "MEDICATION", &self.lexicons.medications, medical),
            ("MedicalTestRecognizer", "MEDICAL_TEST", &self.lexicons.medical_tests, medical),
        ];

        let mut recognizers: Vec<Arc<dyn Recognizer>> = Vec::with_capacity(lexicons.len() + 1);
        for (name, entity_type, phrases, prepositions) in lexicons {
            let recognizer = LexiconRecognizer::new(name, entity_type, phrases, prepositions.clone())
                .with_context(|| format!("Failed to build lexicon recognizer {}", name))?;
            recognizers.push(Arc::new(recognizer));
        }
        recognizers.push(Arc::new(IsraeliIdRecognizer));
        Ok(recognizers)
    }

    pub fn anonymizer(&self) -> Anonymizer {
        Anonymizer::new(
            self.masks.clone(),
            self.lexicons.large_cities.clone(),
            self.lexicons.country_regions.clone(),
        )
    }

    /// Assemble the full pipeline around a statistical recognizer
    pub fn build_pipeline(&self, model: Arc<dyn Recognizer>) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new(Arc::new(self.compile_tables()?), Arc::new(self.anonymizer()))
            .with_limits(self.limits.clone())
            .with_recognizer(model);
        for recognizer in self.recognizers()? {
            pipeline = pipeline.with_recognizer(recognizer);
        }
        Ok(pipeline)
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".hsh").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// ~/.hsh/config.yaml, if present
fn user_config_file() -> Option<PathBuf> {
    let path = dirs::home_dir()?.join(".hsh").join("config.yaml");
    path.exists().then_some(path)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = match std::env::var(CONFIG_ENV) {
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) => std::env::current_dir()
            .ok()
            .and_then(|dir| find_config_file_from(&dir))
            .or_else(user_config_file),
    };

    match config_file {
        Some(path) => ResolvedConfig::from_path(&path),
        None => ResolvedConfig::builtin(),
    }
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
