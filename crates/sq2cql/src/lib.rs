//! sq2cql - Translation of structured cohort queries into CQL.
//!
//! This crate holds the translation layer: the [`MappingContext`] built from
//! the mapping resources, the [`Translator`] seam, and the built-in
//! [`RetrievalTranslator`] engine.

mod concept_tree;
mod context;
mod cql;
mod error;
mod translator;

pub use sq2cql_core::{mapping, query, term_code, tree};

pub use concept_tree::ConceptTree;
pub use context::{CodeSystemAliases, MappingContext, MappingTable};
pub use error::TranslationError;
pub use translator::{RetrievalTranslator, Translator};
