//! Source-specific importers.

mod event;
mod location;
mod ontology;

pub use event::EventImporter;
pub use location::{
    custom_mapping, AccessibilityShortcoming, GeoPoint, LocationEnrichment, LocationImporter,
    LocationRoot, Venue, VenueBuilder, RESERVABLE_TAG,
};
pub use ontology::{Ontology, OntologyTreeImporter, OntologyWordImporter};

use serde_json::Value;
use url::Url;

/// Record ids as strings, whatever their JSON type.
pub(crate) fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The URL without its query string.
pub(crate) fn endpoint_base(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.to_string()
        }
        Err(_) => url.split('?').next().unwrap_or(url).to_string(),
    }
}
