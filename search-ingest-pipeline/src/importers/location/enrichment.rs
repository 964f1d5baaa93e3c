//! Per-run lookup tables joined into venues by unit id.
//!
//! Each source is fetched once per run in full and indexed by unit id, so
//! building a venue needs no further requests.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::errors::PipelineError;
use crate::importers::id_string;
use crate::importers::ontology::{fetch_list, Ontology};
use crate::sources::SourceUrls;
use crate::transport::{fetch_all_results, Transport, HEAVY_TIMEOUT};

/// Connection tag marking a unit whose premises can be reserved.
pub const RESERVABLE_TAG: &str = "#tilojen_varaaminen";

/// Number of accessibility shortcomings for one accessibility profile.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AccessibilityShortcoming {
    pub profile: String,
    /// `None` when the count is unknown.
    pub count: Option<u64>,
}

/// Enrichment data for every unit, fetched once per run.
#[derive(Debug, Default)]
pub struct LocationEnrichment {
    shortcomings: HashMap<String, Vec<AccessibilityShortcoming>>,
    target_groups: HashMap<String, BTreeSet<String>>,
    reservable: HashSet<String>,
    ontology: Ontology,
}

impl LocationEnrichment {
    /// Fetch every enrichment source.
    #[instrument(skip_all)]
    pub async fn fetch(transport: &Transport, sources: &SourceUrls) -> Result<Self, PipelineError> {
        let shortcoming_units = fetch_all_results(
            transport,
            &sources.accessibility_shortcoming_counts,
            "results",
        )
        .await?;

        let services = match transport
            .request_json_with_timeout(&sources.services, HEAVY_TIMEOUT)
            .await?
        {
            Value::Array(items) => items,
            _ => return Err(PipelineError::parse("Expected a list of services")),
        };
        let connections = fetch_list(transport, &sources.connections).await?;
        let ontology = Ontology::fetch(transport, sources).await?;

        let enrichment = Self::from_sources(&shortcoming_units, &services, &connections)
            .with_ontology(ontology);
        info!(
            shortcomings = enrichment.shortcomings.len(),
            target_groups = enrichment.target_groups.len(),
            reservable = enrichment.reservable.len(),
            "Enrichment data fetched"
        );
        Ok(enrichment)
    }

    /// Build the lookup tables from already fetched source lists.
    pub fn from_sources(
        shortcoming_units: &[Value],
        services: &[Value],
        connections: &[Value],
    ) -> Self {
        let mut shortcomings = HashMap::new();
        for unit in shortcoming_units {
            let Some(id) = id_string(unit.get("id")) else {
                continue;
            };
            let mut counts: Vec<AccessibilityShortcoming> = unit
                .get("accessibility_shortcoming_count")
                .and_then(Value::as_object)
                .into_iter()
                .flatten()
                .map(|(profile, count)| AccessibilityShortcoming {
                    profile: profile.clone(),
                    count: count.as_u64(),
                })
                .collect();
            counts.sort();
            shortcomings.insert(id, counts);
        }

        let mut target_groups: HashMap<String, BTreeSet<String>> = HashMap::new();
        for service in services {
            let groups: Vec<String> = strings(service.get("target_groups"));
            for unit_id in service.get("unit_ids").and_then(Value::as_array).into_iter().flatten() {
                if let Some(unit_id) = id_string(Some(unit_id)) {
                    target_groups.entry(unit_id).or_default().extend(groups.iter().cloned());
                }
            }
        }

        let reservable = connections
            .iter()
            .filter(|connection| {
                strings(connection.get("tags"))
                    .iter()
                    .any(|tag| tag == RESERVABLE_TAG)
            })
            .filter_map(|connection| id_string(connection.get("unit_id")))
            .collect();

        Self {
            shortcomings,
            target_groups,
            reservable,
            ontology: Ontology::default(),
        }
    }

    pub fn with_ontology(mut self, ontology: Ontology) -> Self {
        self.ontology = ontology;
        self
    }

    /// Shortcomings of a unit, sorted by profile.
    pub fn shortcomings(&self, unit_id: &str) -> Vec<AccessibilityShortcoming> {
        self.shortcomings.get(unit_id).cloned().unwrap_or_default()
    }

    /// Target groups of a unit's services, sorted and deduplicated.
    pub fn target_groups(&self, unit_id: &str) -> Vec<String> {
        self.target_groups
            .get(unit_id)
            .map(|groups| groups.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_reservable(&self, unit_id: &str) -> bool {
        self.reservable.contains(unit_id)
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }
}

fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}
