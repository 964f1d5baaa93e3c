//! Source API endpoints.

/// Linked events listing, starting from today.
pub const DEFAULT_EVENT_URL: &str = "https://api.hel.fi/linkedevents/v1/event/?start=today";
/// Base URL of the Hauki opening hours API.
pub const DEFAULT_HAUKI_BASE_URL: &str = "https://hauki.api.hel.fi/v1/";

pub const TPR_UNITS_URL: &str = "https://www.hel.fi/palvelukarttaws/rest/v4/unit/?newfeatures=yes";
pub const ACCESSIBILITY_SHORTCOMING_COUNTS_URL: &str = concat!(
    "https://api.hel.fi/servicemap/v2/unit/",
    "?format=json&only=accessibility_shortcoming_count&page_size=1000"
);
pub const SERVICES_URL: &str =
    "https://www.hel.fi/palvelukarttaws/rest/vpalvelurekisteri/description/?alldata=yes";
pub const CONNECTIONS_URL: &str = "https://www.hel.fi/palvelukarttaws/rest/v4/connection/";
pub const ONTOLOGY_WORD_URL: &str = "https://www.hel.fi/palvelukarttaws/rest/v4/ontologyword/";
pub const ONTOLOGY_TREE_URL: &str = "https://www.hel.fi/palvelukarttaws/rest/v4/ontologytree/";

/// Endpoints used by the importers.
///
/// Only the event listing and the Hauki base URL are configurable from the
/// environment; the rest are overridable for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrls {
    pub event: String,
    pub hauki_base: String,
    pub tpr_units: String,
    pub accessibility_shortcoming_counts: String,
    pub services: String,
    pub connections: String,
    pub ontology_words: String,
    pub ontology_tree: String,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            event: DEFAULT_EVENT_URL.to_string(),
            hauki_base: DEFAULT_HAUKI_BASE_URL.to_string(),
            tpr_units: TPR_UNITS_URL.to_string(),
            accessibility_shortcoming_counts: ACCESSIBILITY_SHORTCOMING_COUNTS_URL.to_string(),
            services: SERVICES_URL.to_string(),
            connections: CONNECTIONS_URL.to_string(),
            ontology_words: ONTOLOGY_WORD_URL.to_string(),
            ontology_tree: ONTOLOGY_TREE_URL.to_string(),
        }
    }
}

impl SourceUrls {
    pub fn with_event_url(mut self, url: impl Into<String>) -> Self {
        self.event = url.into();
        self
    }

    /// Set the Hauki base URL. A trailing slash is added when missing.
    pub fn with_hauki_base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.hauki_base = url;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hauki_base_url_gets_trailing_slash() {
        let urls = SourceUrls::default().with_hauki_base_url("http://hauki.test/v1");
        assert_eq!(urls.hauki_base, "http://hauki.test/v1/");
        assert_eq!(urls.event, DEFAULT_EVENT_URL);
    }
}
