//! Stylesheets of document-level style defaults
//!
//! A stylesheet is a TOML file laid out like a document's `params`: top-level
//! keys such as `globalSpacing`, and one table per element kind (`[call]`,
//! `[actor]`, `[fragment]`, ...). It only fills gaps: whatever the document's
//! own `params` sets wins.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::parser::StyleMap;

#[derive(Error, Debug)]
pub enum StylesheetError {
    #[error("cannot read stylesheet: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid stylesheet: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Style defaults shared by many documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Defaults in `params` shape
    pub params: StyleMap,
}

/// File layout: an optional `[metadata]` table beside the params
#[derive(Deserialize)]
struct SheetFile {
    #[serde(default)]
    metadata: SheetMetadata,
    #[serde(flatten)]
    params: StyleMap,
}

#[derive(Deserialize, Default)]
struct SheetMetadata {
    name: Option<String>,
    description: Option<String>,
}

impl FromStr for Stylesheet {
    type Err = StylesheetError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let SheetFile { metadata, params } = toml::from_str(content)?;
        Ok(Stylesheet {
            name: metadata.name,
            description: metadata.description,
            params,
        })
    }
}

impl Stylesheet {
    pub fn from_file(path: &Path) -> Result<Self, StylesheetError> {
        std::fs::read_to_string(path)?.parse()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Copy every default the document's `params` leaves unset
    ///
    /// Tables merge one level deep, so `[call] fontSizePx` still applies when
    /// the document styles `params.call` but not its font size.
    pub fn apply(&self, params: &mut StyleMap) {
        for (key, value) in &self.params {
            if !params.contains_key(key) {
                params.insert(key.clone(), value.clone());
                continue;
            }
            if let (Some(Value::Object(section)), Value::Object(defaults)) = (params.get_mut(key), value) {
                for (inner, default) in defaults {
                    if !section.contains_key(inner) {
                        section.insert(inner.clone(), default.clone());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SHEET: &str = r#"
globalSpacing = 20

[metadata]
name = "Compact"

[call]
fontSizePx = 12
lineColour = "rgb(0,0,255)"

[fragment]
bgColours = ["rgb(250,250,250)", "rgb(235,235,235)"]
"#;

    fn params(value: Value) -> StyleMap {
        match value {
            Value::Object(map) => map,
            _ => StyleMap::new(),
        }
    }

    #[test]
    fn test_parse_toml_with_metadata() {
        let stylesheet = Stylesheet::from_str(SHEET).expect("Should parse");
        assert_eq!(stylesheet.name, Some("Compact".to_string()));
        assert_eq!(stylesheet.description, None);
        assert_eq!(stylesheet.params.get("globalSpacing"), Some(&json!(20)));
        assert!(!stylesheet.params.contains_key("metadata"));
    }

    #[test]
    fn test_fills_only_missing_values() {
        let stylesheet = Stylesheet::from_str(SHEET).expect("Should parse");
        let mut doc = params(json!({
            "globalSpacing": 40,
            "call": {"fontSizePx": 16}
        }));
        stylesheet.apply(&mut doc);

        assert_eq!(
            Value::Object(doc),
            json!({
                "globalSpacing": 40,
                "call": {"fontSizePx": 16, "lineColour": "rgb(0,0,255)"},
                "fragment": {"bgColours": ["rgb(250,250,250)", "rgb(235,235,235)"]}
            })
        );
    }

    #[test]
    fn test_scalar_param_is_not_replaced_by_table() {
        let stylesheet = Stylesheet::from_str("[call]\nfontSizePx = 12\n").expect("Should parse");
        let mut doc = params(json!({"call": "odd"}));
        stylesheet.apply(&mut doc);
        assert_eq!(doc.get("call"), Some(&json!("odd")));
    }

    #[test]
    fn test_default_is_empty() {
        assert!(Stylesheet::default().is_empty());
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = "[call\nfontSizePx = ".parse::<Stylesheet>();
        assert!(matches!(result, Err(StylesheetError::Toml(_))));
    }

    #[test]
    fn test_missing_file_error() {
        let result = Stylesheet::from_file(Path::new("/nonexistent/sheet.toml"));
        assert!(matches!(result, Err(StylesheetError::Read(_))));
    }
}
