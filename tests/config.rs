//! Config Integration Tests
//!
//! Config files on disk drive the tables, lexicons and masks of a pipeline.

use std::sync::Arc;

use tempfile::TempDir;

use hebsafeharbor::config::ResolvedConfig;
use hebsafeharbor::signals::NoopRecognizer;
use hebsafeharbor::Span;

fn write_config(temp: &TempDir, yaml: &str) -> std::path::PathBuf {
    let hsh_dir = temp.path().join(".hsh");
    std::fs::create_dir_all(&hsh_dir).unwrap();
    let path = hsh_dir.join("config.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn test_custom_lexicon_and_masks() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"
version: "1.0"
lexicons:
  cities:
    path: cities.txt
  large_cities: []
anonymizer:
  city_mask: "<עיר_>"
"#,
    );
    std::fs::write(temp.path().join(".hsh").join("cities.txt"), "כפר ורדים\n").unwrap();

    let config = ResolvedConfig::from_path(&path).unwrap();
    assert_eq!(config.lexicons.cities, vec!["כפר ורדים"]);
    assert!(config.lexicons.large_cities.is_empty());

    let pipeline = config.build_pipeline(Arc::new(NoopRecognizer)).unwrap();
    let doc = pipeline.process(None, "גרה בכפר ורדים", vec![]).unwrap();

    assert_eq!(doc.anonymized.unwrap().text, "גרה ב<עיר_>");
}

#[test]
fn test_table_overrides_change_behavior() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"
tables:
  ignored_types: [PERS]
"#,
    );

    let config = ResolvedConfig::from_path(&path).unwrap();
    let pipeline = config.build_pipeline(Arc::new(NoopRecognizer)).unwrap();

    let spans = vec![Span::new(0, 10, "PERS", 0.9, "HebSpacy")];
    let doc = pipeline
        .process(None, "גדעון לבנה הגיע", spans)
        .unwrap();

    assert!(doc.consolidated.is_empty());
    assert_eq!(doc.anonymized.unwrap().text, "גדעון לבנה הגיע");
}

#[test]
fn test_limits_from_config() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "limits:\n  max_text_chars: 4\n");

    let config = ResolvedConfig::from_path(&path).unwrap();
    let pipeline = config.build_pipeline(Arc::new(NoopRecognizer)).unwrap();

    assert_eq!(pipeline.limits().max_text_chars, 4);
    assert!(pipeline.process(None, "ארוך מדי", vec![]).is_err());
}

#[test]
fn test_invalid_yaml_reports_path() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "tables: [not, a, map]\n");

    let err = ResolvedConfig::from_path(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("config.yaml"));
}
