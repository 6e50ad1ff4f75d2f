//! Concept hierarchy module roots.
//!
//! A concept tree file is a JSON array of [`MappingTreeModuleRoot`] objects,
//! one per terminology module. Each root lists the concepts of one code
//! system together with their parent and child keys.

use serde::{Deserialize, Serialize};

use crate::term_code::TermCode;

/// The root of one module of the concept hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingTreeModuleRoot {
    context: TermCode,
    system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default)]
    entries: Vec<MappingTreeModuleEntry>,
}

impl MappingTreeModuleRoot {
    /// Creates a module root for `system` holding the given entries.
    pub fn new(context: TermCode, system: impl Into<String>, entries: Vec<MappingTreeModuleEntry>) -> Self {
        Self {
            context,
            system: system.into(),
            version: None,
            entries,
        }
    }

    /// Returns the context the module's concepts are used in.
    pub fn context(&self) -> &TermCode {
        &self.context
    }

    /// Returns the code system URI of the module's concepts.
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Returns the code system version, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the concept entries in file order.
    pub fn entries(&self) -> &[MappingTreeModuleEntry] {
        &self.entries
    }
}

/// A concept within a module together with its direct neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTreeModuleEntry {
    key: String,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    children: Vec<String>,
}

impl MappingTreeModuleEntry {
    /// Creates an entry with the given parent and child keys.
    pub fn new(key: impl Into<String>, parents: Vec<String>, children: Vec<String>) -> Self {
        Self {
            key: key.into(),
            parents,
            children,
        }
    }

    /// Returns the concept code.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the codes of the direct parents.
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Returns the codes of the direct children.
    pub fn children(&self) -> &[String] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_module_root() {
        let json = r#"[{
            "context": {"system": "fdpg.mii.cds", "code": "Diagnose", "display": "Diagnose"},
            "system": "http://fhir.de/CodeSystem/bfarm/icd-10-gm",
            "version": "2024",
            "entries": [
                {"key": "E10-E14", "children": ["E11"]},
                {"key": "E11", "parents": ["E10-E14"]}
            ]
        }]"#;

        let roots: Vec<MappingTreeModuleRoot> = serde_json::from_str(json).unwrap();
        assert_eq!(roots.len(), 1);

        let root = &roots[0];
        assert_eq!(root.context().code(), "Diagnose");
        assert_eq!(root.version(), Some("2024"));
        assert_eq!(root.entries().len(), 2);
        assert_eq!(root.entries()[0].children(), ["E11"]);
        assert!(root.entries()[1].children().is_empty());
    }

    #[test]
    fn test_entries_default_to_empty() {
        let root: MappingTreeModuleRoot = serde_json::from_str(
            r#"{"context": {"system": "s", "code": "c"}, "system": "urn:test"}"#,
        )
        .unwrap();
        assert!(root.entries().is_empty());
    }
}
