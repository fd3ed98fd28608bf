//! The query specification: what a list request wants to fetch
//!
//! A [`QuerySpec`] is assembled with consuming `with_*` calls (or from raw
//! request parameters, see [`QuerySpec::from_params`](super::builder)) and is
//! read-only afterwards.

use crate::core::field::FieldValue;
use serde::Serialize;

/// `field` case-insensitively contains `value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchClause {
    pub field: String,
    pub value: String,
}

/// `field` is one of `values`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterClause {
    pub field: String,
    pub values: Vec<FieldValue>,
}

/// `field >= from` and/or `field <= to`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeClause {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<FieldValue>,
}

impl RangeClause {
    /// Number of bounds present (0, 1 or 2)
    pub fn bound_count(&self) -> usize {
        usize::from(self.from.is_some()) + usize::from(self.to.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive parse; anything but ASC/DESC is `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    /// The SQL keyword; never bound as a parameter
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortClause {
    pub field: String,
    pub direction: SortDirection,
}

/// One page of results, both values at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: u32,
    per_page: u32,
}

impl Pagination {
    /// `None` when either value is zero
    pub fn new(page: u32, per_page: u32) -> Option<Self> {
        (page >= 1 && per_page >= 1).then_some(Self { page, per_page })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// Rows to skip; saturates instead of overflowing on absurd pages
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1).saturating_mul(i64::from(self.per_page))
    }
}

/// Normalized description of a list request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuerySpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<SearchClause>,
    filters: Vec<FilterClause>,
    ranges: Vec<RangeClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<SortClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
}

impl QuerySpec {
    /// An empty specification: fetch every payment
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.search = Some(SearchClause {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, values: Vec<FieldValue>) -> Self {
        self.filters.push(FilterClause {
            field: field.into(),
            values,
        });
        self
    }

    pub fn with_range(
        mut self,
        field: impl Into<String>,
        from: Option<FieldValue>,
        to: Option<FieldValue>,
    ) -> Self {
        self.ranges.push(RangeClause {
            field: field.into(),
            from,
            to,
        });
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(SortClause {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn search(&self) -> Option<&SearchClause> {
        self.search.as_ref()
    }

    pub fn filters(&self) -> &[FilterClause] {
        &self.filters
    }

    pub fn ranges(&self) -> &[RangeClause] {
        &self.ranges
    }

    pub fn sort(&self) -> Option<&SortClause> {
        self.sort.as_ref()
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    /// True when no clause of any kind is present
    pub fn is_unbounded(&self) -> bool {
        self.search.is_none()
            && self.filters.is_empty()
            && self.ranges.is_empty()
            && self.sort.is_none()
            && self.pagination.is_none()
    }

    /// How many arguments the compiled statement binds
    pub fn expected_arg_count(&self) -> usize {
        usize::from(self.search.is_some())
            + self.filters.iter().filter(|f| !f.values.is_empty()).count()
            + self.ranges.iter().map(RangeClause::bound_count).sum::<usize>()
            + if self.pagination.is_some() { 2 } else { 0 }
    }
}
