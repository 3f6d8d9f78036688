//! List filter, partial filter updates and query-string encoding.
//!
//! # Design
//! `TodoFilter` is the full set of search/sort/pagination parameters sent
//! with `GET /todos`. A field is "present" when it is `Some` and not empty:
//! an empty search string and a zero page, limit or category id count as
//! absent and never reach the query string.
//!
//! `FilterPatch` is the partial form used to merge changes into the store's
//! current filter. Each field is `None` to keep the current value,
//! `Some(None)` to clear it, or `Some(Some(v))` to set it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;
use crate::types::Priority;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Field the server sorts the todo list by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    Priority,
    DueDate,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::Priority => "priority",
            SortField::DueDate => "due_date",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            "title" => Ok(SortField::Title),
            "priority" => Ok(SortField::Priority),
            "due_date" => Ok(SortField::DueDate),
            _ => Err(ParseEnumError {
                kind: "sort field",
                value: s.to_string(),
                expected: "created_at, updated_at, title, priority, due_date",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            _ => Err(ParseEnumError {
                kind: "sort order",
                value: s.to_string(),
                expected: "asc, desc",
            }),
        }
    }
}

/// Search, sort and pagination parameters for a todo list request.
///
/// `Default` is the empty filter. The store starts from
/// [`TodoFilter::initial`], which pins the first page of ten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub search: Option<String>,
    pub category_id: Option<u64>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl TodoFilter {
    pub fn initial() -> Self {
        Self {
            page: Some(DEFAULT_PAGE),
            limit: Some(DEFAULT_LIMIT),
            ..Default::default()
        }
    }

    /// Query parameters for the present fields, in wire order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(id) = self.category_id.filter(|id| *id != 0) {
            pairs.push(("category_id", id.to_string()));
        }
        if let Some(completed) = self.completed {
            pairs.push(("completed", completed.to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        if let Some(page) = self.page.filter(|p| *p != 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l != 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(sort_by) = self.sort_by {
            pairs.push(("sort_by", sort_by.as_str().to_string()));
        }
        if let Some(sort_order) = self.sort_order {
            pairs.push(("sort_order", sort_order.as_str().to_string()));
        }
        pairs
    }

    /// Form-urlencoded query string without the leading `?`. Empty when no
    /// field is present.
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }

    pub fn apply(&mut self, patch: &FilterPatch) {
        fn merge<T: Clone>(slot: &mut Option<T>, change: &Option<Option<T>>) {
            if let Some(value) = change {
                *slot = value.clone();
            }
        }
        merge(&mut self.search, &patch.search);
        merge(&mut self.category_id, &patch.category_id);
        merge(&mut self.completed, &patch.completed);
        merge(&mut self.priority, &patch.priority);
        merge(&mut self.page, &patch.page);
        merge(&mut self.limit, &patch.limit);
        merge(&mut self.sort_by, &patch.sort_by);
        merge(&mut self.sort_order, &patch.sort_order);
    }

    pub fn merged(&self, patch: &FilterPatch) -> Self {
        let mut next = self.clone();
        next.apply(patch);
        next
    }
}

/// A partial `TodoFilter`. Setters take an `Option`: `None` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub search: Option<Option<String>>,
    pub category_id: Option<Option<u64>>,
    pub completed: Option<Option<bool>>,
    pub priority: Option<Option<Priority>>,
    pub page: Option<Option<u32>>,
    pub limit: Option<Option<u32>>,
    pub sort_by: Option<Option<SortField>>,
    pub sort_order: Option<Option<SortOrder>>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, value: Option<String>) -> Self {
        self.search = Some(value);
        self
    }

    pub fn category_id(mut self, value: Option<u64>) -> Self {
        self.category_id = Some(value);
        self
    }

    pub fn completed(mut self, value: Option<bool>) -> Self {
        self.completed = Some(value);
        self
    }

    pub fn priority(mut self, value: Option<Priority>) -> Self {
        self.priority = Some(value);
        self
    }

    pub fn page(mut self, value: Option<u32>) -> Self {
        self.page = Some(value);
        self
    }

    pub fn limit(mut self, value: Option<u32>) -> Self {
        self.limit = Some(value);
        self
    }

    pub fn sort_by(mut self, value: Option<SortField>) -> Self {
        self.sort_by = Some(value);
        self
    }

    pub fn sort_order(mut self, value: Option<SortOrder>) -> Self {
        self.sort_order = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_query() {
        assert!(TodoFilter::default().query_pairs().is_empty());
        assert_eq!(TodoFilter::default().query_string(), "");
    }

    #[test]
    fn only_present_fields_are_emitted() {
        let filter = TodoFilter {
            priority: Some(Priority::High),
            page: Some(1),
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(filter.query_string(), "priority=high&page=1&limit=10");
    }

    #[test]
    fn empty_and_zero_values_count_as_absent() {
        let filter = TodoFilter {
            search: Some(String::new()),
            category_id: Some(0),
            page: Some(0),
            limit: Some(0),
            ..Default::default()
        };
        assert!(filter.query_pairs().is_empty());
    }

    #[test]
    fn completed_false_is_still_present() {
        let filter = TodoFilter {
            completed: Some(false),
            ..Default::default()
        };
        assert_eq!(filter.query_string(), "completed=false");
    }

    #[test]
    fn every_field_in_wire_order() {
        let filter = TodoFilter {
            search: Some("milk & eggs".to_string()),
            category_id: Some(3),
            completed: Some(true),
            priority: Some(Priority::Low),
            page: Some(2),
            limit: Some(20),
            sort_by: Some(SortField::DueDate),
            sort_order: Some(SortOrder::Asc),
        };
        let keys: Vec<_> = filter.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            ["search", "category_id", "completed", "priority", "page", "limit", "sort_by", "sort_order"]
        );
        assert_eq!(
            filter.query_string(),
            "search=milk+%26+eggs&category_id=3&completed=true&priority=low&page=2&limit=20\
             &sort_by=due_date&sort_order=ASC"
        );
    }

    #[test]
    fn patch_keeps_sets_and_clears() {
        let mut filter = TodoFilter {
            search: Some("old".to_string()),
            category_id: Some(4),
            ..TodoFilter::initial()
        };
        let patch = FilterPatch::new()
            .search(Some("new".to_string()))
            .category_id(None)
            .priority(Some(Priority::High));
        filter.apply(&patch);

        assert_eq!(filter.search.as_deref(), Some("new"));
        assert_eq!(filter.category_id, None);
        assert_eq!(filter.priority, Some(Priority::High));
        assert_eq!(filter.page, Some(DEFAULT_PAGE));
        assert_eq!(filter.limit, Some(DEFAULT_LIMIT));
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let filter = TodoFilter::initial();
        assert!(FilterPatch::new().is_empty());
        assert_eq!(filter.merged(&FilterPatch::new()), filter);
    }

    #[test]
    fn sort_enums_parse_loosely() {
        assert_eq!("due-date".parse::<SortField>().unwrap(), SortField::DueDate);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
