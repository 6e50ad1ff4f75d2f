//! Translation context.
//!
//! This module combines the three mapping resources a translator works with:
//!
//! - [`MappingTable`] - Concept key to [`Mapping`] lookup, deduplicated first-wins.
//! - [`ConceptTree`] - Concept hierarchy used to expand concepts to their descendants.
//! - [`CodeSystemAliases`] - Short names for canonical code system URIs.
//!
//! [`MappingContext`] owns all three and is immutable once built.
//!
//! # Example
//!
//! ```
//! use sq2cql::{CodeSystemAliases, ConceptTree, MappingContext, MappingTable};
//! use sq2cql_core::mapping::Mapping;
//!
//! let mappings = MappingTable::from_entries(vec![
//!     Mapping::new("a", "Condition"),
//!     Mapping::new("a", "Observation"),
//! ]);
//! let context = MappingContext::new(mappings, ConceptTree::default(), CodeSystemAliases::empty());
//!
//! // The first entry for a key wins
//! assert_eq!(context.mappings().get("a").unwrap().resource_type(), "Condition");
//! ```

use std::collections::HashMap;

use indexmap::{IndexMap, map::Entry};
use log::debug;

use sq2cql_core::mapping::Mapping;

use crate::concept_tree::ConceptTree;

/// Concept key to mapping lookup table.
///
/// Built from an ordered sequence of entries. When two entries share a key
/// the first one is kept and later ones are dropped. Iteration follows the
/// order in which keys were first seen.
#[derive(Debug, Default, Clone)]
pub struct MappingTable {
    entries: IndexMap<String, Mapping>,
}

impl MappingTable {
    /// Builds the table, keeping the first entry for every key.
    pub fn from_entries(entries: impl IntoIterator<Item = Mapping>) -> Self {
        let mut table = IndexMap::new();
        let mut dropped = 0usize;

        for mapping in entries {
            match table.entry(mapping.key().to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(mapping);
                }
                Entry::Occupied(slot) => {
                    debug!(key = slot.key().as_str(); "Dropping duplicate mapping entry");
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            debug!(dropped, kept = table.len(); "Deduplicated mapping entries");
        }

        Self { entries: table }
    }

    /// Returns the mapping for `key`.
    pub fn get(&self, key: &str) -> Option<&Mapping> {
        self.entries.get(key)
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no mappings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the mappings in first-seen key order.
    pub fn iter(&self) -> impl Iterator<Item = &Mapping> {
        self.entries.values()
    }
}

impl FromIterator<Mapping> for MappingTable {
    fn from_iter<I: IntoIterator<Item = Mapping>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

/// Alias to canonical code system URI table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CodeSystemAliases {
    aliases: HashMap<String, String>,
}

impl CodeSystemAliases {
    /// Creates a table without aliases.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the URI registered for `alias`.
    pub fn uri(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Returns the alias registered for `uri`.
    ///
    /// If several aliases point at the same URI the lexicographically
    /// smallest one is returned.
    pub fn alias_for(&self, uri: &str) -> Option<&str> {
        self.aliases
            .iter()
            .filter(|(_, target)| target.as_str() == uri)
            .map(|(alias, _)| alias.as_str())
            .min()
    }

    /// Iterates over `(alias, uri)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|(alias, uri)| (alias.as_str(), uri.as_str()))
    }

    /// Returns the number of aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns `true` if no aliases are registered.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl From<HashMap<String, String>> for CodeSystemAliases {
    fn from(aliases: HashMap<String, String>) -> Self {
        Self { aliases }
    }
}

/// Everything a translator needs besides the query itself.
#[derive(Debug, Default)]
pub struct MappingContext {
    mappings: MappingTable,
    concept_tree: ConceptTree,
    aliases: CodeSystemAliases,
}

impl MappingContext {
    /// Creates a context from the three mapping resources.
    ///
    /// # Arguments
    ///
    /// * `mappings` - Concept key to mapping table.
    /// * `concept_tree` - Concept hierarchy.
    /// * `aliases` - Code system aliases; use [`CodeSystemAliases::empty`] when none are configured.
    pub fn new(mappings: MappingTable, concept_tree: ConceptTree, aliases: CodeSystemAliases) -> Self {
        Self {
            mappings,
            concept_tree,
            aliases,
        }
    }

    /// Returns the mapping table.
    pub fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    /// Returns the concept hierarchy.
    pub fn concept_tree(&self) -> &ConceptTree {
        &self.concept_tree
    }

    /// Returns the code system aliases.
    pub fn aliases(&self) -> &CodeSystemAliases {
        &self.aliases
    }
}
