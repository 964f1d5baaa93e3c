//! # Search Ingest Shared
//!
//! Shared types used by the ingest pipeline and the search repository:
//! the opaque [`Document`] handed to the index lifecycle manager, the
//! multilingual [`LanguageString`], provenance records and the
//! opening-hours document shape.

pub mod document;
pub mod language;
pub mod linked_data;
pub mod opening_hours;

pub use document::Document;
pub use language::{LanguageString, LANGUAGES};
pub use linked_data::LinkedData;
pub use opening_hours::{
    camelize, OpeningHours, OpeningHoursDay, OpeningHoursTimes, OpeningHoursTimesRange,
};
