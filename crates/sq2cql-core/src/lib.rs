//! sq2cql Core Types
//!
//! This crate provides the data model shared by the sq2cql translation
//! pipeline. It includes:
//!
//! - **Term codes**: Concepts from a terminology system ([`term_code::TermCode`])
//! - **Mappings**: Concept-to-CQL mapping entries ([`mapping::Mapping`])
//! - **Mapping trees**: Concept hierarchy module roots ([`tree::MappingTreeModuleRoot`])
//! - **Structured queries**: Cohort query documents ([`query::StructuredQuery`])
//!
//! All types implement [`serde::Deserialize`] so they can be loaded directly
//! from the JSON resources produced by the ontology tooling.

pub mod mapping;
pub mod query;
pub mod term_code;
pub mod tree;
