//! Multilingual strings.
//!
//! Source APIs deliver translated fields in two shapes:
//!
//! 1. Postfixed flat fields: `"name_fi": "..", "name_sv": "..", "name_en": ".."`
//! 2. A sub-object keyed by language: `"name": {"fi": "..", "en": ".."}`
//!
//! [`LanguageString::from_record`] reads either shape. Filling missing
//! translations from other languages is not done here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supported languages, in priority order.
pub const LANGUAGES: [&str; 3] = ["fi", "sv", "en"];

/// A text value in Finnish, Swedish and English.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageString {
    pub fi: Option<String>,
    pub sv: Option<String>,
    pub en: Option<String>,
}

impl LanguageString {
    pub fn new(fi: Option<String>, sv: Option<String>, en: Option<String>) -> Self {
        Self { fi, sv, en }
    }

    /// Read `field` from a raw source record.
    ///
    /// Postfixed fields win over a sub-object. Returns `None` when neither
    /// shape carries any value.
    pub fn from_record(record: &Value, field: &str) -> Option<Self> {
        if Self::has_postfixed_fields(record, field) {
            let get = |lang: &str| text(record.get(format!("{}_{}", field, lang)));
            return Some(Self::new(get("fi"), get("sv"), get("en")));
        }

        match record.get(field) {
            Some(sub) if is_truthy(sub) => {
                let get = |lang: &str| text(sub.get(lang));
                Some(Self::new(get("fi"), get("sv"), get("en")))
            }
            _ => None,
        }
    }

    /// Value for the given language code.
    pub fn get(&self, lang: &str) -> Option<&str> {
        match lang {
            "fi" => self.fi.as_deref(),
            "sv" => self.sv.as_deref(),
            "en" => self.en.as_deref(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fi.is_none() && self.sv.is_none() && self.en.is_none()
    }

    fn has_postfixed_fields(record: &Value, field: &str) -> bool {
        LANGUAGES
            .iter()
            .filter_map(|lang| record.get(format!("{}_{}", field, lang)))
            .any(is_truthy)
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_postfixed_fields() {
        let record = json!({
            "name_fi": "Roihuvuoren liikuntapuisto",
            "name_sv": "Kasbergets idrottspark",
            "name_en": "Roihuvuori sports park",
        });

        let name = LanguageString::from_record(&record, "name").unwrap();
        assert_eq!(name.fi.as_deref(), Some("Roihuvuoren liikuntapuisto"));
        assert_eq!(name.sv.as_deref(), Some("Kasbergets idrottspark"));
        assert_eq!(name.get("en"), Some("Roihuvuori sports park"));
    }

    #[test]
    fn test_sub_fields_with_missing_language() {
        let record = json!({"price": {"fi": "20/10/5€", "en": "20/10/5€"}});

        let price = LanguageString::from_record(&record, "price").unwrap();
        assert_eq!(price.fi.as_deref(), Some("20/10/5€"));
        assert!(price.sv.is_none());
    }

    #[test]
    fn test_postfixed_wins_over_sub_object() {
        let record = json!({"name": {"fi": "sub"}, "name_fi": "flat"});
        let name = LanguageString::from_record(&record, "name").unwrap();
        assert_eq!(name.fi.as_deref(), Some("flat"));
    }

    #[test]
    fn test_missing_or_empty_field() {
        assert!(LanguageString::from_record(&json!({}), "desc").is_none());
        assert!(LanguageString::from_record(&json!({"desc": {}}), "desc").is_none());
        assert!(LanguageString::from_record(&json!({"desc_fi": ""}), "desc").is_none());
    }
}
