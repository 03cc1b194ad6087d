//! Catalog record types
//!
//! Field names follow the dataset file. Anything the service does not
//! interpret is captured in `extra` and serialized back untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One dataset entry: an author and the works they own
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Author {
    #[serde(rename = "autor_nombre")]
    pub first_name: String,
    #[serde(rename = "autor_apellido")]
    pub last_name: String,
    #[serde(rename = "obras", default)]
    pub works: Vec<Work>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A published work
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Work {
    #[serde(rename = "edicion")]
    pub edition_year: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Author {
    pub fn new(first_name: &str, last_name: &str, works: Vec<Work>) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            works,
            extra: Map::new(),
        }
    }
}

impl Work {
    pub fn new(edition_year: i64) -> Self {
        Self {
            edition_year,
            extra: Map::new(),
        }
    }

    /// Attach an opaque descriptive field (title, publisher, ...)
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_pass_through() {
        let raw = r#"{
            "autor_nombre": "Alexandre",
            "autor_apellido": "Dumas",
            "foto": "dumas.jpg",
            "obras": [{"titulo": "Los tres mosqueteros", "edicion": 1844, "paginas": 700}]
        }"#;

        let author: Author = serde_json::from_str(raw).unwrap();
        assert_eq!(author.first_name, "Alexandre");
        assert_eq!(author.works[0].edition_year, 1844);
        assert_eq!(author.extra["foto"], "dumas.jpg");

        let back = serde_json::to_value(&author).unwrap();
        assert_eq!(back["autor_apellido"], "Dumas");
        assert_eq!(back["foto"], "dumas.jpg");
        assert_eq!(back["obras"][0]["titulo"], "Los tres mosqueteros");
        assert_eq!(back["obras"][0]["paginas"], 700);
    }

    #[test]
    fn test_extra_fields_keep_dataset_order() {
        let raw = r#"{"autor_nombre": "Emilia", "autor_apellido": "Pardo Bazán",
            "zona": "Galicia", "alias": "Condesa", "nacimiento": 1851}"#;

        let author: Author = serde_json::from_str(raw).unwrap();
        let back = serde_json::to_string(&author).unwrap();
        let zona = back.find("\"zona\"").unwrap();
        let alias = back.find("\"alias\"").unwrap();
        let nacimiento = back.find("\"nacimiento\"").unwrap();
        assert!(zona < alias && alias < nacimiento, "{back}");
    }

    #[test]
    fn test_missing_works_defaults_to_empty() {
        let author: Author =
            serde_json::from_str(r#"{"autor_nombre": "Ana", "autor_apellido": "Matute"}"#)
                .unwrap();
        assert!(author.works.is_empty());
    }
}
