//! Registered importers.

use std::fmt;
use std::str::FromStr;

use super::{Importer, BATCH_SIZE};
use crate::errors::PipelineError;
use crate::importers::{EventImporter, LocationImporter, OntologyTreeImporter, OntologyWordImporter};
use crate::sources::SourceUrls;
use crate::transport::Transport;

/// Shared dependencies handed to every importer.
#[derive(Clone)]
pub struct ImporterContext {
    pub transport: Transport,
    pub sources: SourceUrls,
    /// Documents per bulk request for buffered importers.
    pub batch_size: usize,
}

impl ImporterContext {
    pub fn new(transport: Transport, sources: SourceUrls) -> Self {
        Self {
            transport,
            sources,
            batch_size: BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImporterKind {
    Location,
    Event,
    OntologyWord,
    OntologyTree,
}

impl ImporterKind {
    /// Every registered importer, in default run order.
    pub const ALL: [ImporterKind; 4] = [
        ImporterKind::Location,
        ImporterKind::Event,
        ImporterKind::OntologyWord,
        ImporterKind::OntologyTree,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ImporterKind::Location => "location",
            ImporterKind::Event => "event",
            ImporterKind::OntologyWord => "ontology_word",
            ImporterKind::OntologyTree => "ontology_tree",
        }
    }

    /// Construct the importer.
    pub fn build(&self, context: &ImporterContext) -> Box<dyn Importer> {
        match self {
            ImporterKind::Location => Box::new(LocationImporter::new(context)),
            ImporterKind::Event => Box::new(EventImporter::new(context)),
            ImporterKind::OntologyWord => Box::new(OntologyWordImporter::new(context)),
            ImporterKind::OntologyTree => Box::new(OntologyTreeImporter::new(context)),
        }
    }
}

impl FromStr for ImporterKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| PipelineError::UnknownImporter(s.to_string()))
    }
}

impl fmt::Display for ImporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;
    use std::sync::Arc;

    #[test]
    fn test_names_round_trip() {
        for kind in ImporterKind::ALL {
            assert_eq!(kind.to_string().parse::<ImporterKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = "administrative_division".parse::<ImporterKind>().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnknownImporter(name) if name == "administrative_division"
        ));
    }

    #[test]
    fn test_built_importers_declare_their_groups() {
        let transport = Transport::new(Arc::new(ScriptedClient::new()));
        let context = ImporterContext::new(transport, SourceUrls::default());

        for kind in ImporterKind::ALL {
            let importer = kind.build(&context);
            assert_eq!(importer.name(), kind.name());
            let groups = importer.index_groups();
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0].base_name(), kind.name());
        }
    }
}
