//! The location document.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use super::enrichment::{AccessibilityShortcoming, LocationEnrichment};
use crate::importers::id_string;
use search_ingest_shared::{LanguageString, LinkedData, OpeningHours, LANGUAGES};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMeta {
    pub id: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub postal_code: Option<String>,
    pub street_address: Option<LanguageString>,
    pub city: Option<LanguageString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueLocation {
    pub url: Option<LanguageString>,
    pub address: Address,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    pub reservable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accessibility {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub www: Option<String>,
    pub shortcomings: Vec<AccessibilityShortcoming>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OntologyWord {
    pub id: String,
    pub label: Option<LanguageString>,
}

/// A place where services are provided.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub meta: NodeMeta,
    pub name: Option<LanguageString>,
    pub description: Option<LanguageString>,
    pub location: VenueLocation,
    pub opening_hours: Option<OpeningHours>,
    pub reservation: Reservation,
    pub accessibility: Accessibility,
    pub target_groups: Vec<String>,
    pub ontology_words: Vec<OntologyWord>,
}

/// Completion input for one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub input: Vec<String>,
    pub contexts: SuggestionContext,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionContext {
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Top-level document of the location index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRoot {
    pub venue: Venue,
    pub links: Vec<LinkedData>,
    pub suggest: Vec<Suggestion>,
    pub location: Option<GeoPoint>,
}

/// Builds a [`Venue`] from a raw unit record and the run's enrichment data.
///
/// The raw record is only read.
pub struct VenueBuilder<'a> {
    id: String,
    unit: &'a Value,
    enrichment: Option<&'a LocationEnrichment>,
    opening_hours: Option<OpeningHours>,
}

impl<'a> VenueBuilder<'a> {
    pub fn new(id: impl Into<String>, unit: &'a Value) -> Self {
        Self {
            id: id.into(),
            unit,
            enrichment: None,
            opening_hours: None,
        }
    }

    pub fn enrichment(mut self, enrichment: &'a LocationEnrichment) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    pub fn opening_hours(mut self, opening_hours: OpeningHours) -> Self {
        self.opening_hours = Some(opening_hours);
        self
    }

    fn text(&self, key: &str) -> Option<String> {
        match self.unit.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn language_string(&self, field: &str) -> Option<LanguageString> {
        LanguageString::from_record(self.unit, field)
    }

    /// Latitude and longitude, when both are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let latitude = self.unit.get("latitude").and_then(Value::as_f64)?;
        let longitude = self.unit.get("longitude").and_then(Value::as_f64)?;
        Some(Coordinates { latitude, longitude })
    }

    fn ontology_words(&self) -> Vec<OntologyWord> {
        let Some(enrichment) = self.enrichment else {
            return Vec::new();
        };
        self.unit
            .get("ontologyword_ids")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|id| id_string(Some(id)))
            .filter_map(|id| {
                let word = enrichment.ontology().word(&id)?;
                Some(OntologyWord {
                    label: LanguageString::from_record(word, "ontologyword"),
                    id,
                })
            })
            .collect()
    }

    /// Ontology labels usable as completion input: the unit's ontology
    /// words, its tree nodes and their ancestors, per language.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        let mut labels: Vec<LanguageString> = self
            .ontology_words()
            .into_iter()
            .filter_map(|word| word.label)
            .collect();

        if let Some(enrichment) = self.enrichment {
            let ontology = enrichment.ontology();
            let mut node_ids = BTreeSet::new();
            for id in self
                .unit
                .get("ontologytree_ids")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|id| id_string(Some(id)))
            {
                node_ids.extend(
                    ontology
                        .ancestor_ids(&id)
                        .iter()
                        .filter_map(|ancestor| id_string(Some(ancestor))),
                );
                node_ids.insert(id);
            }
            labels.extend(
                node_ids
                    .iter()
                    .filter_map(|id| ontology.tree_node(id))
                    .filter_map(|node| LanguageString::from_record(node, "name")),
            );
        }

        LANGUAGES
            .iter()
            .map(|lang| Suggestion {
                input: labels
                    .iter()
                    .filter_map(|label| label.get(lang))
                    .map(str::to_string)
                    .collect(),
                contexts: SuggestionContext {
                    language: lang.to_string(),
                },
            })
            .collect()
    }

    pub fn build(self) -> Venue {
        let (shortcomings, target_groups, reservable) = match self.enrichment {
            Some(e) => (
                e.shortcomings(&self.id),
                e.target_groups(&self.id),
                e.is_reservable(&self.id),
            ),
            None => (Vec::new(), Vec::new(), false),
        };

        Venue {
            meta: NodeMeta {
                id: self.id.clone(),
                created_at: self.text("created_time"),
                updated_at: self.text("modified_time"),
            },
            name: self.language_string("name"),
            description: self.language_string("desc"),
            location: VenueLocation {
                url: self.language_string("www"),
                address: Address {
                    postal_code: self.text("address_zip"),
                    street_address: self.language_string("street_address"),
                    city: self.language_string("address_city"),
                },
                coordinates: self.coordinates(),
            },
            reservation: Reservation { reservable },
            accessibility: Accessibility {
                email: self.text("accessibility_email"),
                phone: self.text("accessibility_phone"),
                www: self.text("accessibility_www"),
                shortcomings,
            },
            target_groups,
            ontology_words: self.ontology_words(),
            opening_hours: self.opening_hours,
        }
    }
}
