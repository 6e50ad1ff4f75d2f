//! Concept hierarchy index.
//!
//! [`ConceptTree`] is built once from the module roots of a concept tree
//! file and answers descendant queries during translation. Module roots are
//! grouped by code system; when several roots cover the same system their
//! entries are merged, with the first definition of a key winning.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use sq2cql_core::tree::{MappingTreeModuleEntry, MappingTreeModuleRoot};

/// Immutable index over the concept hierarchy.
#[derive(Debug, Default)]
pub struct ConceptTree {
    roots: Vec<MappingTreeModuleRoot>,
    /// system -> key -> (root index, entry index)
    index: HashMap<String, HashMap<String, (usize, usize)>>,
}

impl ConceptTree {
    /// Builds the tree from module roots in file order.
    pub fn new(roots: Vec<MappingTreeModuleRoot>) -> Self {
        let mut index: HashMap<String, HashMap<String, (usize, usize)>> = HashMap::new();

        for (root_idx, root) in roots.iter().enumerate() {
            let keys = index.entry(root.system().to_string()).or_default();
            for (entry_idx, entry) in root.entries().iter().enumerate() {
                keys.entry(entry.key().to_string())
                    .or_insert((root_idx, entry_idx));
            }
        }

        debug!(modules = roots.len(), systems = index.len(); "Concept tree indexed");

        Self { roots, index }
    }

    /// Returns the module roots the tree was built from.
    pub fn module_roots(&self) -> &[MappingTreeModuleRoot] {
        &self.roots
    }

    /// Returns `true` if the tree has no module roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Looks up the entry for `code` within `system`.
    pub fn entry(&self, system: &str, code: &str) -> Option<&MappingTreeModuleEntry> {
        let (root_idx, entry_idx) = *self.index.get(system)?.get(code)?;
        Some(&self.roots[root_idx].entries()[entry_idx])
    }

    /// Returns `code` followed by all of its descendants, breadth first.
    ///
    /// Each code appears once even in poly-hierarchies. Children that have
    /// no entry of their own are still reported but not expanded further.
    /// Returns `None` if `code` is not part of the tree.
    pub fn descendants_or_self(&self, system: &str, code: &str) -> Option<Vec<String>> {
        self.entry(system, code)?;

        let mut seen = HashSet::from([code.to_string()]);
        let mut order = vec![code.to_string()];
        let mut queue = VecDeque::from([code.to_string()]);

        while let Some(current) = queue.pop_front() {
            let Some(entry) = self.entry(system, &current) else {
                continue;
            };
            for child in entry.children() {
                if seen.insert(child.clone()) {
                    order.push(child.clone());
                    queue.push_back(child.clone());
                }
            }
        }

        Some(order)
    }
}
