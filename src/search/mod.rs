//! Turns a free-text search plus an optional column label into a where-clause
//! document for the `filter` module.
//!
//! The query builder knows nothing about tenants. Callers scope its output
//! through the tenant guard before running it.

pub mod field_map;

use std::collections::HashMap;

use serde_json::{json, Value};
use uuid::Uuid;

pub use field_map::{
    CASE_EXPORT_HEADERS, CASE_FIELD_MAP, CASE_SEARCH_FIELDS, CUSTOMER_AUTOCOMPLETE_FIELDS, CUSTOMER_SEARCH_FIELDS, ID_FIELD,
};

/// What a collection exposes to search.
pub struct SearchSpec<'a> {
    /// Label (or field name) to storage field.
    pub field_map: &'a HashMap<&'static str, &'static str>,
    /// Fields ORed together when no usable field is given.
    pub all_fields: &'a [&'static str],
}

impl SearchSpec<'static> {
    pub fn cases() -> Self {
        Self {
            field_map: &CASE_FIELD_MAP,
            all_fields: &CASE_SEARCH_FIELDS,
        }
    }
}

/// Builds the filter for `search` restricted to `field` when it maps to a
/// known storage field. Search text is matched as a literal, case-insensitive
/// substring.
pub fn build_search_query(search: &str, field: Option<&str>, spec: &SearchSpec<'_>) -> Value {
    let search = search.trim();
    if search.is_empty() {
        return json!({});
    }

    let mapped = field
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .and_then(|f| spec.field_map.get(f).copied());

    match mapped {
        Some(ID_FIELD) => match Uuid::try_parse(search) {
            Ok(id) => json!({ ID_FIELD: id }),
            // Not an identifier: behave as if no field was chosen
            Err(_) => any_field_contains(search, spec.all_fields),
        },
        Some(storage_field) => json!({ storage_field: { "$iregex": regex::escape(search) } }),
        None => any_field_contains(search, spec.all_fields),
    }
}

/// `$or` of case-insensitive substring matches over `fields`.
pub fn any_field_contains(search: &str, fields: &[&str]) -> Value {
    let pattern = regex::escape(search);
    let clauses: Vec<Value> = fields
        .iter()
        .map(|f| json!({ *f: { "$iregex": pattern } }))
        .collect();
    json!({ "$or": clauses })
}

pub fn case_search(search: &str, field: Option<&str>) -> Value {
    build_search_query(search, field, &SearchSpec::cases())
}

/// Customer list search across name, email, phone and national id.
pub fn customer_search(search: &str) -> Value {
    let search = search.trim();
    if search.is_empty() {
        return json!({});
    }
    any_field_contains(search, &CUSTOMER_SEARCH_FIELDS)
}

/// Autocomplete filter, or `None` when the query is shorter than `min_chars`.
pub fn customer_autocomplete(query: &str, min_chars: usize) -> Option<Value> {
    let query = query.trim();
    if query.chars().count() < min_chars {
        return None;
    }
    Some(any_field_contains(query, &CUSTOMER_AUTOCOMPLETE_FIELDS))
}
