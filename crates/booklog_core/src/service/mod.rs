//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the presentation shell decoupled from storage details.

pub mod library_service;
