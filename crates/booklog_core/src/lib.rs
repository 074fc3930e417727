//! Core domain logic for the booklog personal catalog.
//! This crate owns the book gateway and its document store.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, LibraryConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::book::{Book, LibraryStats};
pub use repo::book_repo::{
    BookRepository, CollectionBookRepository, RepoError, RepoResult, SqliteBookRepository,
    DEFAULT_BOOK_COLLECTION,
};
pub use service::library_service::{sample_books, LibraryService};
pub use store::{Document, DocumentCollection, Filter, SqliteCollection, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
