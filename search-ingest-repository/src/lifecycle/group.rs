//! Naming of generations and aliases for a logical index group.

use std::fmt;

/// Suffix appended to the base name to form the staging alias.
pub const STAGING_ALIAS_SUFFIX: &str = "_wip";

/// A logical index identified by a stable base name, e.g. `location`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexGroup {
    base_name: String,
}

impl IndexGroup {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Alias queried by readers. Same as the base name.
    pub fn published_alias(&self) -> &str {
        &self.base_name
    }

    /// Alias targeted by the running import.
    pub fn staging_alias(&self) -> String {
        format!("{}{}", self.base_name, STAGING_ALIAS_SUFFIX)
    }

    /// The two physical generation names, slot 1 first.
    pub fn generations(&self) -> [String; 2] {
        [
            format!("{}_1", self.base_name),
            format!("{}_2", self.base_name),
        ]
    }

    /// The generation to build into, given the currently published one.
    pub fn free_generation(&self, published: Option<&str>) -> String {
        let [first, second] = self.generations();
        if published == Some(first.as_str()) {
            second
        } else {
            first
        }
    }
}

impl fmt::Display for IndexGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_name)
    }
}
