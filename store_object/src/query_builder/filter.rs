//! Caller filters and the soft-delete aware composition step

use crate::document::DELETED_AT;
use bson::{doc, Bson, Document, Regex};
use std::collections::BTreeMap;

use super::ordering::SortOrder;

/// Options the store uses for case-insensitive pattern matches
const CASE_INSENSITIVE: &str = "i";

/// Which side of the soft-delete marker a query looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Records whose `deleted_at` is unset
    #[default]
    Live,
    /// Soft-deleted records only
    Deleted,
}

impl Visibility {
    fn predicate(&self) -> Bson {
        match self {
            Visibility::Live => Bson::Null,
            Visibility::Deleted => Bson::Document(doc! { "$ne": Bson::Null }),
        }
    }
}

/// A per-call query description.
///
/// `filter` holds literal match values or operator expressions, `regex_filter` holds
/// case-insensitive patterns that are rewritten into regular expression predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub visibility: Visibility,
    pub sort_by: String,
    pub sort_mode: i8,
    pub limit: Option<i64>,
    pub skip: Option<u64>,
    pub filter: Document,
    pub regex_filter: BTreeMap<String, String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `field` against a literal value or an operator document
    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.filter.insert(field, value.into());
        self
    }

    /// Match `field` against a case-insensitive pattern
    pub fn regex(mut self, field: &str, pattern: &str) -> Self {
        self.regex_filter
            .insert(field.to_string(), pattern.to_string());
        self
    }

    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort_by = field.to_string();
        self.sort_mode = order.mode();
        self
    }

    /// Look at soft-deleted records instead of live ones
    pub fn trashed(mut self) -> Self {
        self.visibility = Visibility::Deleted;
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Compose the final predicate, see [`merge_filter`]
    pub fn merge(self) -> Self {
        merge_filter(self)
    }
}

impl From<Document> for Filter {
    fn from(filter: Document) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

/// Build the predicate actually sent to the store.
///
/// Every `regex_filter` entry replaces the same key in `filter` with a case-insensitive
/// regular expression. `deleted_at` is then forced to the predicate of the filter's
/// visibility (the unset sentinel for live records) whatever the caller put there.
/// Sort, skip and limit are left untouched.
pub fn merge_filter(mut filter: Filter) -> Filter {
    for (field, pattern) in &filter.regex_filter {
        filter.filter.insert(
            field.as_str(),
            Bson::RegularExpression(Regex {
                pattern: pattern.clone(),
                options: CASE_INSENSITIVE.to_string(),
            }),
        );
    }
    let predicate = filter.visibility.predicate();
    filter.filter.insert(DELETED_AT, predicate);

    filter
}
