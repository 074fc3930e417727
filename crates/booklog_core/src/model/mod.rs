//! Book catalog domain model.
//!
//! # Responsibility
//! - Define the fixed-shape book record and the statistics read model.
//!
//! # Invariants
//! - Books carry no synthetic identity; removal addresses them by title.

pub mod book;
