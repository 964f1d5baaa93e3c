//! Zero-downtime index rebuilds.
//!
//! Every logical index group is backed by two physical generations,
//! `{base}_1` and `{base}_2`. Readers query the published alias `{base}`;
//! an import writes through the staging alias `{base}_wip` into the free
//! generation and the aliases are swapped atomically when it finishes.
//!
//! A group moves through `UNINITIALIZED -> STAGING -> PUBLISHED`. A run that
//! dies while STAGING leaves the published generation untouched; the next
//! `initialize` removes whatever it left behind.

mod group;
mod manager;

pub use group::{IndexGroup, STAGING_ALIAS_SUFFIX};
pub use manager::{IndexLifecycleManager, PublishStats};
