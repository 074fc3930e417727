//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the book gateway contract.
//! - Isolate document-collection queries from service orchestration.
//!
//! # Invariants
//! - Repository APIs distinguish empty outcomes from store failures.

pub mod book_repo;
