//! Location importer.
//!
//! Imports service units from the unit registry into the `location` index,
//! joined with accessibility, target group, reservability, ontology and
//! opening hours data.

mod enrichment;
mod venue;

pub use enrichment::{AccessibilityShortcoming, LocationEnrichment, RESERVABLE_TAG};
pub use venue::{GeoPoint, LocationRoot, Venue, VenueBuilder};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, warn};

use super::ontology::fetch_list;
use super::{endpoint_base, id_string};
use crate::errors::PipelineError;
use crate::importer::{BatchBuffer, ImportSummary, Importer, ImporterContext};
use crate::opening_hours::OpeningHoursFetcher;
use crate::sources::SourceUrls;
use crate::transport::Transport;
use search_ingest_repository::{IndexGroup, IndexLifecycleManager};
use search_ingest_shared::{Document, LinkedData};

const TPR_SERVICE: &str = "tpr";

/// Mapping applied to the staging generation before publishing.
pub fn custom_mapping() -> Value {
    let mut language_properties = Map::new();
    for (language, analyzer) in [("fi", "finnish"), ("sv", "swedish"), ("en", "english")] {
        language_properties.insert(
            language.to_string(),
            json!({
                "type": "text",
                "analyzer": analyzer,
                "fields": {"keyword": {"type": "keyword", "ignore_above": 256}}
            }),
        );
    }

    json!({
        "properties": {
            "suggest": {
                "type": "completion",
                "contexts": [{"name": "language", "type": "category"}]
            },
            "venue": {
                "properties": {
                    "name": {"properties": language_properties},
                    "description": {"properties": language_properties},
                    "openingHours": {
                        "properties": {
                            "openRanges": {"type": "date_range"}
                        }
                    },
                    "accessibility": {
                        "properties": {
                            "shortcomings": {
                                "type": "nested",
                                "properties": {
                                    "profile": {"type": "keyword"},
                                    // larger than any real count, sorts unknowns last
                                    "count": {"type": "integer", "null_value": 9999}
                                }
                            }
                        }
                    }
                }
            },
            "location": {"type": "geo_point"}
        }
    })
}

/// Imports venues into the `location` group with bulk writes.
pub struct LocationImporter {
    transport: Transport,
    sources: SourceUrls,
    batch_size: usize,
    group: IndexGroup,
}

impl LocationImporter {
    pub fn new(context: &ImporterContext) -> Self {
        Self {
            transport: context.transport.clone(),
            sources: context.sources.clone(),
            batch_size: context.batch_size,
            group: IndexGroup::new("location"),
        }
    }

    async fn build_document(
        &self,
        id: &str,
        unit: &Value,
        enrichment: &LocationEnrichment,
        opening_hours: &mut OpeningHoursFetcher,
    ) -> Result<Document, PipelineError> {
        let mut raw = unit.clone();
        if let Value::Object(fields) = &mut raw {
            fields.insert("id".to_string(), Value::String(id.to_string()));
            fields.insert("origin".to_string(), Value::String(TPR_SERVICE.to_string()));
        }
        let mut links = vec![LinkedData::new(
            TPR_SERVICE,
            format!("{}{}/", endpoint_base(&self.sources.tpr_units), id),
            raw,
        )];

        let (hours, hours_link) = opening_hours.get_opening_hours_and_link(id).await;
        links.extend(hours_link);

        let builder = VenueBuilder::new(id, unit).enrichment(enrichment).opening_hours(hours);
        let location = builder.coordinates().map(|c| GeoPoint {
            lat: c.latitude,
            lon: c.longitude,
        });
        let suggest = builder.suggestions();

        let root = LocationRoot {
            venue: builder.build(),
            links,
            suggest,
            location,
        };
        Ok(Document::identified(id, &root)?)
    }
}

#[async_trait]
impl Importer for LocationImporter {
    fn name(&self) -> &'static str {
        "location"
    }

    fn index_groups(&self) -> Vec<IndexGroup> {
        vec![self.group.clone()]
    }

    #[instrument(skip_all, fields(group = %self.group))]
    async fn run(
        &mut self,
        publisher: &IndexLifecycleManager,
    ) -> Result<ImportSummary, PipelineError> {
        publisher.apply_mapping(&self.group, &custom_mapping()).await?;

        let units = fetch_list(&self.transport, &self.sources.tpr_units).await?;
        let enrichment = LocationEnrichment::fetch(&self.transport, &self.sources).await?;
        info!(units = units.len(), "Fetched units");

        let ids: Vec<String> = units.iter().filter_map(|unit| id_string(unit.get("id"))).collect();
        let mut opening_hours = OpeningHoursFetcher::new(
            self.transport.clone(),
            self.sources.hauki_base.clone(),
            &ids,
        );
        let mut buffer = BatchBuffer::new(self.group.clone(), self.batch_size);
        let mut summary = ImportSummary {
            received: units.len(),
            documents: 0,
        };

        for unit in &units {
            let Some(id) = id_string(unit.get("id")) else {
                warn!("Skipping unit without id");
                continue;
            };
            debug!(unit_id = %id, "Building venue");

            let document = self
                .build_document(&id, unit, &enrichment, &mut opening_hours)
                .await?;
            buffer.push(publisher, document).await?;
            summary.documents += 1;
        }
        buffer.flush(publisher).await?;

        info!(documents = summary.documents, "Imported locations");
        Ok(summary)
    }
}
