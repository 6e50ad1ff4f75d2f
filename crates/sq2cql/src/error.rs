//! Error types for query translation.
//!
//! This module provides [`TranslationError`], returned by every
//! [`Translator`](crate::Translator) when a query cannot be expressed with
//! the given mapping context.

use thiserror::Error;

/// The error type for translating a structured query into CQL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslationError {
    #[error("Structured query has no inclusion criteria")]
    EmptyInclusion,

    #[error("Criterion without term codes in {section} group {group}")]
    MissingTermCodes { section: &'static str, group: usize },

    #[error("No mapping found for concept key '{key}'")]
    MappingNotFound { key: String },

    #[error("Unsupported {kind} on concept key '{key}'")]
    UnsupportedFilter { kind: &'static str, key: String },

    #[error("Time restriction on concept key '{key}' has no mapped element path")]
    TimeRestrictionNotMapped { key: String },
}
