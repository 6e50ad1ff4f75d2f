//! Mapping resource loading.
//!
//! This module reads the three JSON resources named by an [`Invocation`]
//! and turns them into the typed structures of the translation context.

use std::{collections::HashMap, fs, path::Path};

use log::{debug, info};
use serde::de::DeserializeOwned;

use sq2cql::{
    CodeSystemAliases, ConceptTree, MappingContext, MappingTable, mapping::Mapping,
    tree::MappingTreeModuleRoot,
};

use crate::{
    args::Invocation,
    error::{ResourceError, ResourceKind},
};

/// The loaded mapping resources of one run.
#[derive(Debug)]
pub struct Resources {
    pub mappings: MappingTable,
    pub concept_tree: ConceptTree,
    pub aliases: CodeSystemAliases,
}

impl Resources {
    /// Loads every resource named by `invocation`.
    ///
    /// # Errors
    ///
    /// See [`Resources::load_files`].
    pub fn load(invocation: &Invocation) -> Result<Self, ResourceError> {
        Self::load_files(
            &invocation.cql_mapping,
            &invocation.concept_tree,
            invocation.code_system_aliases.as_deref(),
        )
    }

    /// Loads the resources from the given files.
    ///
    /// Resources are loaded in order: CQL mapping, concept tree, code system
    /// aliases. Without an aliases file the alias table is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for the first resource that is missing,
    /// unreadable, or not of the expected shape.
    pub fn load_files(
        cql_mapping: &Path,
        concept_tree: &Path,
        code_system_aliases: Option<&Path>,
    ) -> Result<Self, ResourceError> {
        let entries: Vec<Mapping> = load_json(ResourceKind::CqlMapping, cql_mapping)?;
        let entry_count = entries.len();
        let mappings = MappingTable::from_entries(entries);
        info!(entries = entry_count, keys = mappings.len(); "Loaded CQL mapping");

        let roots: Vec<MappingTreeModuleRoot> =
            load_json(ResourceKind::ConceptTree, concept_tree)?;
        info!(modules = roots.len(); "Loaded concept tree");
        let concept_tree = ConceptTree::new(roots);

        let aliases = match code_system_aliases {
            Some(path) => {
                let aliases: HashMap<String, String> =
                    load_json(ResourceKind::CodeSystemAliases, path)?;
                info!(aliases = aliases.len(); "Loaded code system aliases");
                CodeSystemAliases::from(aliases)
            }
            None => {
                debug!("No code system aliases configured");
                CodeSystemAliases::empty()
            }
        };

        Ok(Self {
            mappings,
            concept_tree,
            aliases,
        })
    }

    /// Combines the resources into a translation context.
    pub fn into_context(self) -> MappingContext {
        MappingContext::new(self.mappings, self.concept_tree, self.aliases)
    }
}

/// Reads `path` and deserializes its JSON content as `T`.
///
/// # Errors
///
/// Returns [`ResourceError`] if the file cannot be read or its content does
/// not deserialize into `T`.
pub fn load_json<T: DeserializeOwned>(kind: ResourceKind, path: &Path) -> Result<T, ResourceError> {
    debug!(kind:% = kind, path:? = path; "Loading resource");

    let content = fs::read_to_string(path).map_err(|err| ResourceError::new(kind, path, err))?;
    serde_json::from_str(&content).map_err(|err| ResourceError::new(kind, path, err))
}
