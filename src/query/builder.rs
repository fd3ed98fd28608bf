//! Builds a [`QuerySpec`] from raw request parameters
//!
//! # Recognized keys
//!
//! ```text
//! search_field, search_value           one search clause
//! filter_field[i], filter_value[i]     repeated, paired by position
//! range_field[i], from[i], to[i]       repeated, paired by position
//! sort_field, sort_direction           ASC/DESC, case-insensitive
//! page, per_page                       both >= 1
//! ```
//!
//! Unknown keys are ignored. Sort and pagination are permissive: a sort
//! direction other than ASC/DESC means "no sort", and a missing, zero,
//! negative or non-numeric `page`/`per_page` means "no pagination" (return
//! everything). Neither is an error.

use super::column::{Column, Operation};
use super::spec::{FilterClause, Pagination, QuerySpec, SortDirection};
use super::QueryError;
use crate::core::field::FieldValue;
use std::collections::HashMap;

/// Raw request parameters: key → values in the order they appeared
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    entries: HashMap<String, Vec<String>>,
}

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect `key=value` pairs, keeping repeated keys in order
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.push(key, value);
        }
        params
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// Every value given for `key`
    pub fn all(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first non-empty value given for `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.all(key)
            .iter()
            .map(String::as_str)
            .find(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl QuerySpec {
    /// Build a specification from raw request parameters.
    ///
    /// Field names are checked against the column allow-list and values are
    /// parsed to the column's kind here, so a malformed request never reaches
    /// the compiler or the store.
    pub fn from_params(params: &RawParams) -> Result<QuerySpec, QueryError> {
        let mut spec = QuerySpec::new();

        if let (Some(field), Some(value)) = (params.first("search_field"), params.first("search_value")) {
            Column::resolve(field, Operation::Search)?;
            spec = spec.with_search(field, value);
        }

        for clause in filter_clauses(params)? {
            spec = spec.with_filter(clause.field, clause.values);
        }

        spec = range_clauses(params, spec)?;

        if let Some(field) = params.first("sort_field") {
            Column::resolve(field, Operation::Sort)?;
            if let Some(direction) = params.first("sort_direction").and_then(SortDirection::parse) {
                spec = spec.with_sort(field, direction);
            }
        }

        let page = params.first("page").and_then(parse_positive);
        let per_page = params.first("per_page").and_then(parse_positive);
        if let Some(pagination) = page.zip(per_page).and_then(|(p, n)| Pagination::new(p, n)) {
            spec = spec.with_pagination(pagination);
        }

        Ok(spec)
    }
}

/// Pair `filter_field[i]` with `filter_value[i]`, merging pairs that name
/// the same field into one clause in first-appearance order.
fn filter_clauses(params: &RawParams) -> Result<Vec<FilterClause>, QueryError> {
    let fields = params.all("filter_field");
    let values = params.all("filter_value");

    if fields.len() != values.len() {
        return Err(QueryError::MismatchedPairs {
            key: "filter_value".to_string(),
            paired_with: "filter_field".to_string(),
            expected: fields.len(),
            found: values.len(),
        });
    }

    let mut clauses: Vec<FilterClause> = Vec::new();
    for (field, raw) in fields.iter().zip(values) {
        let column = Column::resolve(field, Operation::Filter)?;
        let value = parse_value(column, "filter_value", raw)?;

        match clauses.iter_mut().find(|c| &c.field == field) {
            Some(clause) => clause.values.push(value),
            None => clauses.push(FilterClause {
                field: field.clone(),
                values: vec![value],
            }),
        }
    }

    Ok(clauses)
}

fn range_clauses(params: &RawParams, mut spec: QuerySpec) -> Result<QuerySpec, QueryError> {
    let fields = params.all("range_field");
    let froms = params.all("from");
    let tos = params.all("to");

    for (key, bounds) in [("from", froms), ("to", tos)] {
        if bounds.len() > fields.len() {
            return Err(QueryError::MismatchedPairs {
                key: key.to_string(),
                paired_with: "range_field".to_string(),
                expected: fields.len(),
                found: bounds.len(),
            });
        }
    }

    for (i, field) in fields.iter().enumerate() {
        let (from, to) = (bound_at(froms, i), bound_at(tos, i));
        if from.is_none() && to.is_none() {
            continue;
        }

        let column = Column::resolve(field, Operation::Range)?;
        let from = from.map(|raw| parse_value(column, "from", raw)).transpose()?;
        let to = to.map(|raw| parse_value(column, "to", raw)).transpose()?;
        spec = spec.with_range(field.as_str(), from, to);
    }

    Ok(spec)
}

/// A missing or empty bound counts as absent
fn bound_at(bounds: &[String], i: usize) -> Option<&str> {
    bounds.get(i).map(String::as_str).filter(|v| !v.is_empty())
}

fn parse_value(column: Column, key: &str, raw: &str) -> Result<FieldValue, QueryError> {
    column
        .kind()
        .parse(raw)
        .map_err(|reason| QueryError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason,
        })
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n > 0)
}
