//! Query engine
//!
//! Derives the visible sequence of users from the working set: free-text
//! search, per-field filters, then a stable sort. Everything here is a pure
//! function of its inputs; the current `QueryState` is owned by the store.
//!
//! Search and filters are both plain predicates combined with AND, so the
//! order they are applied in does not change the result. Both derive first
//! and last names through `models::split_name`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::UserRecord;

/// Per-field substring filters; empty strings mean "no constraint"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
}

impl FilterCriteria {
    fn entries(&self) -> [&str; 4] {
        [
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email.as_str(),
            self.department.as_str(),
        ]
    }

    /// No criterion constrains anything
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of non-blank criteria
    pub fn active_count(&self) -> usize {
        self.entries().iter().filter(|v| !v.trim().is_empty()).count()
    }

    /// Every non-blank criterion is a case-insensitive substring of its field
    pub fn matches(&self, record: &UserRecord) -> bool {
        let fields = [
            record.first_name(),
            record.last_name(),
            record.email.as_str(),
            record.department(),
        ];

        self.entries()
            .iter()
            .zip(fields)
            .all(|(pattern, value)| contains_ignore_case(value, pattern))
    }
}

/// `true` when `pattern` is blank or a case-insensitive substring of `value`
fn contains_ignore_case(value: &str, pattern: &str) -> bool {
    let pattern = pattern.trim();
    pattern.is_empty() || value.to_lowercase().contains(&pattern.to_lowercase())
}

/// Normalize raw search input: trimmed and lowercased
pub fn normalize_search(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether any of name, username, email or department contains `query`
///
/// `query` must already be normalized.
pub fn matches_search(record: &UserRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    [
        record.name.as_str(),
        record.username.as_str(),
        record.email.as_str(),
        record.department(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(query))
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

/// Field to sort by
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Id,
    Name,
    Email,
    Username,
    /// Any other field; known text fields sort by value, unknown ones keep
    /// input order
    Other(String),
}

impl SortField {
    pub fn as_str(&self) -> &str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Username => "username",
            SortField::Other(name) => name,
        }
    }

    fn key<'a>(&self, record: &'a UserRecord) -> SortKey<'a> {
        let text = match self {
            SortField::Id => return SortKey::Number(record.id),
            SortField::Name => record.name.as_str(),
            SortField::Email => record.email.as_str(),
            SortField::Username => record.username.as_str(),
            SortField::Other(name) => match name.as_str() {
                "phone" => record.phone.as_deref().unwrap_or(""),
                "website" => record.website.as_deref().unwrap_or(""),
                "department" => record.department(),
                "firstName" => record.first_name(),
                "lastName" => record.last_name(),
                _ => return SortKey::Unordered,
            },
        };
        SortKey::Text(text)
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "email" => SortField::Email,
            "username" => SortField::Username,
            other => SortField::Other(other.to_string()),
        })
    }
}

enum SortKey<'a> {
    Number(i64),
    Text(&'a str),
    Unordered,
}

impl SortKey<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            _ => Ordering::Equal,
        }
    }
}

/// Sort field and direction; defaults to id ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }
}

/// Stable in-place sort; equal keys keep their input order in both directions
pub fn sort_records(records: &mut [UserRecord], sort: &SortSpec) {
    records.sort_by(|a, b| {
        let ordering = sort.field.key(a).compare(&sort.field.key(b));
        match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Search text, filters and sort applied to the working set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub filters: FilterCriteria,
    /// Normalized search text
    pub search: String,
    pub sort: SortSpec,
}

impl QueryState {
    pub fn set_search(&mut self, raw: &str) {
        self.search = normalize_search(raw);
    }

    /// Search or any filter is constraining the view
    pub fn is_filtering(&self) -> bool {
        !self.search.is_empty() || !self.filters.is_empty()
    }

    pub fn derive(&self, working_set: &[UserRecord]) -> Vec<UserRecord> {
        derive_view(working_set, &self.filters, &self.search, &self.sort)
    }
}

/// Filtered, searched and sorted copy of `working_set`
///
/// `search` is normalized here, so raw input is accepted.
pub fn derive_view(
    working_set: &[UserRecord],
    filters: &FilterCriteria,
    search: &str,
    sort: &SortSpec,
) -> Vec<UserRecord> {
    let query = normalize_search(search);
    let mut view: Vec<UserRecord> = working_set
        .iter()
        .filter(|record| matches_search(record, &query))
        .filter(|record| filters.matches(record))
        .cloned()
        .collect();
    sort_records(&mut view, sort);
    view
}
