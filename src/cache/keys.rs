//! Cache Key Module
//!
//! Deterministic key construction for the search, page and filter stores.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

/// Key under which the enumerated filter options are cached.
pub const FILTER_OPTIONS_KEY: &str = "filter_options";

/// Request parameter carrying the free-text query.
pub const QUERY_PARAM: &str = "q";

// == Search Filters ==
/// Active filter values of a search request, ordered by filter name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    values: BTreeMap<String, String>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter. Blank values are treated as "no filter".
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if !value.is_empty() {
            self.values.insert(name.into(), value.to_string());
        }
    }

    /// Splits raw request parameters into the query text and its filters.
    pub fn from_params(params: &HashMap<String, String>) -> (String, Self) {
        let mut filters = Self::new();
        let mut query = String::new();
        for (name, value) in params {
            if name == QUERY_PARAM {
                query = value.clone();
            } else {
                filters.insert(name.clone(), value.clone());
            }
        }
        (query, filters)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// == Normalization ==
/// Trims the query and collapses internal runs of whitespace.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_field(key: &mut String, field: &str) {
    // Writing to a String cannot fail
    let _ = write!(key, "{}:{}", field.len(), field);
}

// == Search Key ==
/// Builds the search store key for a query and its filters.
///
/// Every field is length-prefixed, so distinct normalized requests never
/// share a key even when values contain the separators.
pub fn generate_search_key(query: &str, filters: &SearchFilters) -> String {
    let mut key = String::from("search:");
    push_field(&mut key, &normalize_query(query));
    for (name, value) in filters.iter() {
        key.push('|');
        push_field(&mut key, name);
        key.push('=');
        push_field(&mut key, value);
    }
    key
}

// == Page Key ==
/// Builds the page store key for a page id.
pub fn page_key(page_id: &str) -> String {
    format!("page:{}", page_id)
}
