use std::error::Error;

use clap::Parser;
use dotenv::dotenv;
use tracing::error;

use search_ingest::logging::{init_logging, LogFormat};
use search_ingest::{run_importers, Cli, Dependencies, IndexingError, Settings};
use search_ingest_pipeline::ImporterKind;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging(LogFormat::from_env());

    let cli = Cli::parse();

    if cli.list {
        for kind in ImporterKind::ALL {
            println!("{}", kind);
        }
        return;
    }

    if let Err(e) = run(&cli).await {
        error!(error = %e, "Import failed");

        let mut source = e.source();
        while let Some(err) = source {
            error!(cause = %err, "Caused by");
            source = err.source();
        }

        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), IndexingError> {
    let kinds = cli.selected();
    let settings = Settings::from_env()?;
    let dependencies = Dependencies::new(&settings)?;

    run_importers(&dependencies, &kinds).await
}
