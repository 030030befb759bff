//! Query-parameter construction for catalog requests.
//!
//! The catalog API takes a `fields` parameter (comma-joined field names) and
//! a `filter` parameter (` AND `-joined `key=value` clauses); see
//! <https://static.oqmd.org/static/docs/restful.html#kw-ref> for how filters
//! compose. Pagination adds `offset` and `limit` on top.

use std::collections::BTreeMap;

use crate::paginator::PageRequest;

/// An immutable set of query parameters for one logical request.
///
/// Built fresh per request; paginated variants are derived with
/// [`QueryParams::with_page`] rather than mutated in place. Filter clauses
/// join in sorted key order so the rendered string is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Turn field names and filter constraints into query parameters.
    ///
    /// Empty `fields` means no `fields` key at all, and likewise for
    /// `filters` — the server's defaults apply.
    pub fn build(fields: &[&str], filters: &BTreeMap<String, String>) -> Self {
        let mut pairs = Vec::new();

        if !fields.is_empty() {
            pairs.push(("fields".to_owned(), fields.join(",")));
        }
        if !filters.is_empty() {
            let clauses: Vec<String> = filters
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            pairs.push(("filter".to_owned(), clauses.join(" AND ")));
        }

        Self { pairs }
    }

    /// Derive the parameters for one planned page.
    pub fn with_page(&self, page: PageRequest) -> Self {
        let mut pairs = self.pairs.clone();
        pairs.push(("offset".to_owned(), page.offset.to_string()));
        pairs.push(("limit".to_owned(), page.limit.to_string()));
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Render as a percent-encoded query string. Only parameter values are
    /// encoded; key names are plain ASCII by construction.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
