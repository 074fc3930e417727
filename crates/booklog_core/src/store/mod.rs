//! Schemaless document collections.
//!
//! # Responsibility
//! - Define the document shape and the filter language used by the gateway.
//! - Define the collection contract (insert, delete-one, find, count).
//!
//! # Invariants
//! - Documents are JSON objects; the store adds `_id` on insert.
//! - Filters are evaluated against whole documents, never partial rows.
//! - Store order is insertion order.

use crate::db::DbError;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqliteCollection;

/// Field holding the store-assigned document id.
pub const DOCUMENT_ID_FIELD: &str = "_id";

/// One schemaless record.
pub type Document = Map<String, Value>;

/// Store-assigned document id in string form.
pub type DocumentId = String;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for document persistence, decoding and filter construction.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialization(serde_json::Error),
    /// Substring pattern cannot be compiled into a matcher.
    InvalidPattern(regex::Error),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::InvalidPattern(err) => write!(f, "invalid filter pattern: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored document: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidPattern(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Field-matching predicate over documents.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field is present and equal to `value`.
    Eq { field: String, value: Value },
    /// Field is a string containing the pattern text, ignoring case.
    ContainsIgnoreCase { field: String, pattern: Regex },
    /// At least one branch matches.
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Builds a case-insensitive substring filter.
    ///
    /// `needle` is matched literally; regex metacharacters are escaped.
    pub fn contains_ignore_case(field: impl Into<String>, needle: &str) -> StoreResult<Self> {
        let pattern = RegexBuilder::new(&regex::escape(needle))
            .case_insensitive(true)
            .build()
            .map_err(StoreError::InvalidPattern)?;
        Ok(Self::ContainsIgnoreCase {
            field: field.into(),
            pattern,
        })
    }

    pub fn or(branches: impl IntoIterator<Item = Filter>) -> Self {
        Self::Or(branches.into_iter().collect())
    }

    /// Returns whether `document` satisfies this filter.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => document.get(field) == Some(value),
            Self::ContainsIgnoreCase { field, pattern } => document
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| pattern.is_match(text)),
            Self::Or(branches) => branches.iter().any(|branch| branch.matches(document)),
        }
    }
}

/// Collection contract used by the book gateway.
pub trait DocumentCollection {
    /// Inserts one document and returns its store-assigned id.
    fn insert_one(&self, document: &Document) -> StoreResult<DocumentId>;
    /// Inserts all documents atomically and returns their ids in order.
    fn insert_many(&self, documents: &[Document]) -> StoreResult<Vec<DocumentId>>;
    /// Deletes the first matching document; returns the number deleted (0 or 1).
    fn delete_one(&self, filter: &Filter) -> StoreResult<usize>;
    /// Returns all matching documents in store order.
    fn find(&self, filter: &Filter) -> StoreResult<Vec<Document>>;
    /// Counts matching documents.
    fn count_documents(&self, filter: &Filter) -> StoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::{Document, Filter};
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn eq_requires_present_and_equal_field() {
        let filter = Filter::eq("read", true);
        assert!(filter.matches(&doc(json!({"read": true}))));
        assert!(!filter.matches(&doc(json!({"read": false}))));
        assert!(!filter.matches(&doc(json!({"title": "no flag"}))));
    }

    #[test]
    fn contains_ignore_case_matches_partial_text() {
        let filter = Filter::contains_ignore_case("author", "CLE").unwrap();
        assert!(filter.matches(&doc(json!({"author": "James Clear"}))));
        assert!(!filter.matches(&doc(json!({"author": "Cal Newport"}))));
    }

    #[test]
    fn contains_ignore_case_skips_non_string_fields() {
        let filter = Filter::contains_ignore_case("year", "20").unwrap();
        assert!(!filter.matches(&doc(json!({"year": 2018}))));
    }

    #[test]
    fn contains_ignore_case_escapes_metacharacters() {
        let filter = Filter::contains_ignore_case("title", "c++ (2nd").unwrap();
        assert!(filter.matches(&doc(json!({"title": "Effective C++ (2nd ed.)"}))));
        assert!(!filter.matches(&doc(json!({"title": "cc (2nd ed.)"}))));
    }

    #[test]
    fn or_matches_any_branch() {
        let filter = Filter::or([
            Filter::contains_ignore_case("title", "deep").unwrap(),
            Filter::contains_ignore_case("author", "deep").unwrap(),
        ]);
        assert!(filter.matches(&doc(json!({"title": "Deep Work", "author": "Cal Newport"}))));
        assert!(filter.matches(&doc(json!({"title": "Essays", "author": "Deepak"}))));
        assert!(!filter.matches(&doc(json!({"title": "Essays", "author": "Montaigne"}))));
        assert!(!Filter::Or(Vec::new()).matches(&doc(json!({}))));
    }
}
