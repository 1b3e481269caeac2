//! Page query-string parameters.

use url::form_urlencoded;

/// Present in the page URL to drop the source attribution line.
pub const NO_SOURCE: &str = "noSource";
/// Set by the embedding parent to address this frame.
pub const CHILD_ID: &str = "childId";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse `location.search`, with or without the leading `?`.
    pub fn parse(search: &str) -> Self {
        let query = search.strip_prefix('?').unwrap_or(search);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// `?noSource` with any value, including none.
    pub fn hide_source(&self) -> bool {
        self.contains(NO_SOURCE)
    }

    pub fn child_id(&self) -> &str {
        self.get(CHILD_ID).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_without_value() {
        let q = QueryParams::parse("?noSource");
        assert!(q.hide_source());
        assert_eq!(q.get(NO_SOURCE), Some(""));
    }

    #[test]
    fn absent_flag() {
        let q = QueryParams::parse("?foo=1&bar");
        assert!(!q.hide_source());
        assert!(q.contains("bar"));
        assert_eq!(q.child_id(), "");
        assert!(!QueryParams::parse("").hide_source());
    }

    #[test]
    fn child_id_is_decoded() {
        let q = QueryParams::parse("initialWidth=640&childId=chart%20one&noSource=true");
        assert_eq!(q.child_id(), "chart one");
        assert!(q.hide_source());
        assert_eq!(q.get("initialWidth"), Some("640"));
    }
}
