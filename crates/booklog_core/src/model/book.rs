//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical five-field book record.
//! - Define read/unread statistics derived from record counts.
//!
//! # Invariants
//! - `year` is a non-negative integer with no upper bound.
//! - `read` is always defined; absence in storage means unread.
//! - `percentage_read` is `0.0` for an empty library.

use serde::{Deserialize, Serialize};

/// One catalog entry.
///
/// Titles are not unique; two books may share every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    /// Publication year.
    pub year: u32,
    /// Free-form genre; empty when unknown.
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub read: bool,
}

impl Book {
    /// Creates an unread book without a genre.
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: u32) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
            genre: String::new(),
            read: false,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }
}

/// Library size and read ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LibraryStats {
    pub total: u64,
    pub read: u64,
    /// Share of read books in percent, `0.0..=100.0`.
    pub percentage_read: f64,
}

impl LibraryStats {
    /// Derives statistics from raw counts.
    pub fn from_counts(total: u64, read: u64) -> Self {
        let percentage_read = if total > 0 {
            read as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total,
            read,
            percentage_read,
        }
    }

    pub fn unread(&self) -> u64 {
        self.total.saturating_sub(self.read)
    }
}
