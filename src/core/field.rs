//! Typed field values used in query clauses

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The storage kind of a queryable column.
///
/// Raw request values are parsed according to the kind of the column they
/// target, so the bound parameters carry the column's SQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Decimal,
    Timestamp,
    Uuid,
}

impl FieldKind {
    /// Parse a raw request value into a typed field value
    ///
    /// Timestamps accept RFC 3339 (`2024-05-01T10:00:00Z`) or a bare date
    /// (`2024-05-01`, read as midnight UTC).
    pub fn parse(self, raw: &str) -> Result<FieldValue, String> {
        match self {
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Decimal => BigDecimal::from_str(raw.trim())
                .map(FieldValue::Decimal)
                .map_err(|e| format!("expected a decimal number ({})", e)),
            FieldKind::Timestamp => parse_timestamp(raw.trim())
                .map(FieldValue::Timestamp)
                .ok_or_else(|| "expected an RFC 3339 timestamp or YYYY-MM-DD date".to_string()),
            FieldKind::Uuid => Uuid::parse_str(raw.trim())
                .map(FieldValue::Uuid)
                .map_err(|e| format!("expected a UUID ({})", e)),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Decimal => "decimal",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Uuid => "uuid",
        };
        f.write_str(name)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A typed value that can appear in a filter or range clause
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Decimal(BigDecimal),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl FieldValue {
    /// The kind this value was parsed as
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Decimal(_) => FieldKind::Decimal,
            FieldValue::Timestamp(_) => FieldKind::Timestamp,
            FieldValue::Uuid(_) => FieldKind::Uuid,
        }
    }

    /// Get the value as a string if possible
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compare two values of the same kind.
    ///
    /// Returns `None` when the kinds differ.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            FieldValue::Uuid(id) => write!(f, "{}", id),
        }
    }
}
