//! Entity categories.
//!
//! Two spans of the same category are redundant detections of one concept;
//! two spans of different categories are a genuine type conflict.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse grouping of fine-grained entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Name,
    Location,
    Org,
    Date,
    Id,
    Contact,
    Medical,
    #[serde(rename = "MISC__AFF")]
    MiscAff,
    /// Entity types missing from the mapping
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Name => "NAME",
            Category::Location => "LOCATION",
            Category::Org => "ORG",
            Category::Date => "DATE",
            Category::Id => "ID",
            Category::Contact => "CONTACT",
            Category::Medical => "MEDICAL",
            Category::MiscAff => "MISC__AFF",
            Category::Other => "OTHER",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed `entity_type -> category` mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMap {
    types: BTreeMap<String, Category>,
}

impl CategoryMap {
    pub fn new(types: BTreeMap<String, Category>) -> Self {
        Self { types }
    }

    /// Category of an entity type (`Other` when unmapped)
    pub fn category_of(&self, entity_type: &str) -> Category {
        self.types
            .get(entity_type)
            .copied()
            .unwrap_or(Category::Other)
    }

    /// All mapped entity types, sorted
    pub fn entity_types(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        let pairs: &[(&str, Category)] = &[
            ("PERS", Category::Name),
            ("PER", Category::Name),
            ("LOC", Category::Location),
            ("GPE", Category::Location),
            ("COUNTRY", Category::Location),
            ("CITY", Category::Location),
            ("ORG", Category::Org),
            ("FAC", Category::Org),
            ("TIME", Category::Date),
            ("DATE", Category::Date),
            ("DATE_TIME", Category::Date),
            ("HEBREW_DATE", Category::Date),
            ("LATIN_DATE", Category::Date),
            ("PREPOSITION_DATE", Category::Date),
            ("NOISY_DATE", Category::Date),
            ("BIRTH_DATE", Category::Date),
            ("MEDICAL_DATE", Category::Date),
            ("MISC__AFF", Category::MiscAff),
            ("CREDIT_CARD", Category::Id),
            ("ISRAELI_ID_NUMBER", Category::Id),
            ("ID", Category::Id),
            ("EMAIL_ADDRESS", Category::Contact),
            ("IP_ADDRESS", Category::Contact),
            ("URL", Category::Contact),
            ("PHONE_NUMBER", Category::Contact),
            ("DISEASE", Category::Medical),
            ("MEDICATION", Category::Medical),
            ("MEDICAL_TEST", Category::Medical),
        ];

        Self::new(
            pairs
                .iter()
                .map(|(entity_type, category)| (entity_type.to_string(), *category))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let map = CategoryMap::default();
        assert_eq!(map.category_of("PERS"), Category::Name);
        assert_eq!(map.category_of("GPE"), Category::Location);
        assert_eq!(map.category_of("EMAIL_ADDRESS"), Category::Contact);
        assert_eq!(map.category_of("ISRAELI_ID_NUMBER"), Category::Id);
        assert_eq!(map.category_of("MEDICAL_DATE"), Category::Date);
        assert_eq!(map.category_of("SOMETHING_NEW"), Category::Other);
    }

    #[test]
    fn test_yaml_names() {
        let map: CategoryMap = serde_yaml::from_str("PERS: NAME\nMISC__AFF: MISC__AFF\n").unwrap();
        assert_eq!(map.category_of("PERS"), Category::Name);
        assert_eq!(map.category_of("MISC__AFF"), Category::MiscAff);
        assert_eq!(Category::MiscAff.to_string(), "MISC__AFF");
    }
}
