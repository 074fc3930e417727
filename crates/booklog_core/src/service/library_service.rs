//! Library use-case service.
//!
//! # Responsibility
//! - Provide the catalog entry points used by the presentation shell.
//! - Derive statistics from repository counts.
//!
//! # Invariants
//! - Each call maps to exactly one repository operation (statistics: two counts).
//! - Service layer remains storage-agnostic.

use crate::model::book::{Book, LibraryStats};
use crate::repo::book_repo::{BookRepository, RepoResult};
use log::info;

/// Use-case service wrapper for catalog operations.
pub struct LibraryService<R: BookRepository> {
    repo: R,
}

/// Starter records inserted by [`LibraryService::seed_sample_books`].
pub fn sample_books() -> Vec<Book> {
    vec![
        Book::new("Atomic Habits", "James Clear", 2018),
        Book::new("Deep Work", "Cal Newport", 2016),
        Book::new("The 5 AM Club", "Robin Sharma", 2018),
    ]
}

impl<R: BookRepository> LibraryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a book from primitive form input.
    ///
    /// # Contract
    /// - No duplicate check; the same title may be added repeatedly.
    pub fn add_book(
        &self,
        title: impl Into<String>,
        author: impl Into<String>,
        year: u32,
        genre: impl Into<String>,
        read: bool,
    ) -> RepoResult<()> {
        let book = Book::new(title, author, year)
            .with_genre(genre)
            .with_read(read);
        self.repo.add_book(&book)
    }

    /// Removes one book by exact title.
    ///
    /// Returns `false` when nothing matched; that is not an error.
    pub fn remove_book(&self, title: &str) -> RepoResult<bool> {
        self.repo.remove_book(title)
    }

    /// Finds books whose title or author contains `query`, ignoring case.
    pub fn search_books(&self, query: &str) -> RepoResult<Vec<Book>> {
        self.repo.search_books(query)
    }

    /// Lists all books in store order.
    pub fn list_books(&self) -> RepoResult<Vec<Book>> {
        self.repo.list_books()
    }

    /// Lists titles of all books in store order, duplicates included.
    pub fn list_titles(&self) -> RepoResult<Vec<String>> {
        Ok(self
            .repo
            .list_books()?
            .into_iter()
            .map(|book| book.title)
            .collect())
    }

    /// Returns total count and read percentage.
    pub fn statistics(&self) -> RepoResult<LibraryStats> {
        let total = self.repo.count_books()?;
        let read = self.repo.count_read_books()?;
        Ok(LibraryStats::from_counts(total, read))
    }

    /// Inserts the starter records in one batch.
    pub fn seed_sample_books(&self) -> RepoResult<usize> {
        let inserted = self.repo.add_books(&sample_books())?;
        info!("event=library_seed module=service status=ok count={inserted}");
        Ok(inserted)
    }
}
