//! Indexable document type.

use serde::Serialize;
use serde_json::Value;

/// A ready-to-index record.
///
/// A document either carries an explicit identifier, in which case indexing it
/// again with the same identifier overwrites the previous version, or it is
/// auto-identified by the search engine and every write appends a new document.
///
/// Documents are immutable once built; the pipeline only reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: Option<String>,
    source: Value,
}

impl Document {
    /// Create an auto-identified document from a JSON body.
    pub fn new(source: Value) -> Self {
        Self { id: None, source }
    }

    /// Create a document with an explicit identifier (upsert semantics).
    pub fn with_id(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: Some(id.into()),
            source,
        }
    }

    /// Serialize any value into an auto-identified document.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::to_value(value)?))
    }

    /// Serialize any value into a document with an explicit identifier.
    pub fn identified<T: Serialize>(
        id: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::with_id(id, serde_json::to_value(value)?))
    }

    /// The explicit identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The JSON body.
    pub fn source(&self) -> &Value {
        &self.source
    }

    /// Split into identifier and body.
    pub fn into_parts(self) -> (Option<String>, Value) {
        (self.id, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Word {
        name: &'static str,
    }

    #[test]
    fn test_auto_identified_document() {
        let doc = Document::new(json!({"name": "sauna"}));
        assert!(doc.id().is_none());
        assert_eq!(doc.source()["name"], "sauna");
    }

    #[test]
    fn test_identified_from_serializable() {
        let doc = Document::identified("42", &Word { name: "uimahalli" }).unwrap();
        assert_eq!(doc.id(), Some("42"));
        assert_eq!(doc.source(), &json!({"name": "uimahalli"}));

        let (id, source) = doc.into_parts();
        assert_eq!(id.as_deref(), Some("42"));
        assert_eq!(source["name"], "uimahalli");
    }
}
