//! Opening hours for venues.
//!
//! [`OpeningHoursFetcher`] fetches opening hours from Hauki in batches and
//! turns each venue's day windows into a list of open ranges: the union of
//! its `open` windows minus every `closed` window.

mod fetcher;
mod range;

pub use fetcher::{
    open_ranges, OpeningHoursFetcher, DEFAULT_BATCH_SIZE, DEFAULT_TIME_ZONE,
    NUMBER_OF_DAYS_TO_FETCH,
};
pub use range::{subtract_all, DateTimeRange, Interval};
