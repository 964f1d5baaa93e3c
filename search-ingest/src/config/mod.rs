//! Configuration for the search ingest command.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::Settings;
