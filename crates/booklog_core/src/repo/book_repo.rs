//! Book repository contracts and document-collection implementation.
//!
//! # Responsibility
//! - Translate book operations into single document-collection queries.
//! - Keep document encoding details inside the persistence boundary.
//!
//! # Invariants
//! - Not-found conditions are empty results or `false`, never errors.
//! - `remove_book` deletes at most one document per call.
//! - Read paths reject documents that cannot be decoded as books.

use crate::model::book::Book;
use crate::store::{Document, DocumentCollection, Filter, SqliteCollection, StoreError};
use log::debug;
use rusqlite::Connection;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Default collection name for book documents.
pub const DEFAULT_BOOK_COLLECTION: &str = "books";

const TITLE_FIELD: &str = "title";
const AUTHOR_FIELD: &str = "author";
const READ_FIELD: &str = "read";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for book persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    /// Stored document does not have the shape of a book.
    InvalidRecord(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidRecord(message) => write!(f, "invalid persisted book data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidRecord(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Repository interface for the book gateway.
pub trait BookRepository {
    /// Inserts one book; duplicates are allowed.
    fn add_book(&self, book: &Book) -> RepoResult<()>;
    /// Inserts several books in one store call and returns how many were stored.
    fn add_books(&self, books: &[Book]) -> RepoResult<usize>;
    /// Removes the first book with exactly this title. Returns whether one was removed.
    fn remove_book(&self, title: &str) -> RepoResult<bool>;
    /// Returns books whose title or author contains `query`, ignoring case.
    fn search_books(&self, query: &str) -> RepoResult<Vec<Book>>;
    /// Returns every book in store order.
    fn list_books(&self) -> RepoResult<Vec<Book>>;
    /// Counts all books.
    fn count_books(&self) -> RepoResult<u64>;
    /// Counts books flagged as read.
    fn count_read_books(&self) -> RepoResult<u64>;
}

/// Book repository over any document collection.
pub struct CollectionBookRepository<C: DocumentCollection> {
    collection: C,
}

/// Book repository over a SQLite-backed collection.
pub type SqliteBookRepository<'conn> = CollectionBookRepository<SqliteCollection<'conn>>;

impl<C: DocumentCollection> CollectionBookRepository<C> {
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    fn find_books(&self, filter: &Filter) -> RepoResult<Vec<Book>> {
        self.collection
            .find(filter)?
            .into_iter()
            .map(document_to_book)
            .collect()
    }
}

impl<'conn> CollectionBookRepository<SqliteCollection<'conn>> {
    /// Binds a repository to `collection` inside an open store connection.
    pub fn open(conn: &'conn Connection, collection: &str) -> Self {
        Self::new(SqliteCollection::new(conn, collection))
    }
}

impl<C: DocumentCollection> BookRepository for CollectionBookRepository<C> {
    fn add_book(&self, book: &Book) -> RepoResult<()> {
        let document = book_to_document(book)?;
        self.collection.insert_one(&document)?;
        debug!("event=book_add module=repo status=ok");
        Ok(())
    }

    fn add_books(&self, books: &[Book]) -> RepoResult<usize> {
        let documents = books
            .iter()
            .map(book_to_document)
            .collect::<RepoResult<Vec<_>>>()?;
        let ids = self.collection.insert_many(&documents)?;
        debug!("event=book_add module=repo status=ok count={}", ids.len());
        Ok(ids.len())
    }

    fn remove_book(&self, title: &str) -> RepoResult<bool> {
        let deleted = self
            .collection
            .delete_one(&Filter::eq(TITLE_FIELD, title))?;
        debug!("event=book_remove module=repo status=ok deleted={deleted}");
        Ok(deleted > 0)
    }

    fn search_books(&self, query: &str) -> RepoResult<Vec<Book>> {
        let started_at = Instant::now();
        let filter = Filter::or([
            Filter::contains_ignore_case(TITLE_FIELD, query)?,
            Filter::contains_ignore_case(AUTHOR_FIELD, query)?,
        ]);
        let books = self.find_books(&filter)?;
        debug!(
            "event=book_search module=repo status=ok query_chars={} hits={} duration_ms={}",
            query.chars().count(),
            books.len(),
            started_at.elapsed().as_millis()
        );
        Ok(books)
    }

    fn list_books(&self) -> RepoResult<Vec<Book>> {
        self.find_books(&Filter::All)
    }

    fn count_books(&self) -> RepoResult<u64> {
        Ok(self.collection.count_documents(&Filter::All)?)
    }

    fn count_read_books(&self) -> RepoResult<u64> {
        Ok(self
            .collection
            .count_documents(&Filter::eq(READ_FIELD, true))?)
    }
}

fn book_to_document(book: &Book) -> RepoResult<Document> {
    match serde_json::to_value(book).map_err(StoreError::from)? {
        Value::Object(document) => Ok(document),
        other => Err(RepoError::InvalidRecord(format!(
            "book serialized to non-object value `{other}`"
        ))),
    }
}

fn document_to_book(document: Document) -> RepoResult<Book> {
    serde_json::from_value(Value::Object(document))
        .map_err(|err| RepoError::InvalidRecord(err.to_string()))
}
