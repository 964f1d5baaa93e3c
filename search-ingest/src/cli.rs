//! Command line arguments.

use clap::Parser;

use search_ingest_pipeline::ImporterKind;

/// Import source data into the search index.
#[derive(Parser, Debug)]
#[command(name = "search-ingest")]
#[command(about = "Import source data into the search index", long_about = None)]
pub struct Cli {
    /// Importers to run, in order (default: all registered importers)
    pub importers: Vec<ImporterKind>,

    /// Print the registered importer names and exit
    #[arg(long)]
    pub list: bool,
}

impl Cli {
    /// Importers to run, without duplicates.
    pub fn selected(&self) -> Vec<ImporterKind> {
        if self.importers.is_empty() {
            return ImporterKind::ALL.to_vec();
        }

        let mut selected = Vec::with_capacity(self.importers.len());
        for kind in &self.importers {
            if !selected.contains(kind) {
                selected.push(*kind);
            }
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_selects_all() {
        let cli = Cli::try_parse_from(["search-ingest"]).unwrap();
        assert_eq!(cli.selected(), ImporterKind::ALL.to_vec());
        assert!(!cli.list);
    }

    #[test]
    fn test_named_importers_keep_order() {
        let cli =
            Cli::try_parse_from(["search-ingest", "event", "ontology_word", "event"]).unwrap();
        assert_eq!(
            cli.selected(),
            vec![ImporterKind::Event, ImporterKind::OntologyWord]
        );
    }

    #[test]
    fn test_unknown_importer_is_usage_error() {
        let err = Cli::try_parse_from(["search-ingest", "event", "nope"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_list_flag() {
        let cli = Cli::try_parse_from(["search-ingest", "--list"]).unwrap();
        assert!(cli.list);
    }
}
