//! Terminology concepts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A concept from a terminology system.
///
/// Two term codes denote the same concept when their `system` and `code`
/// agree; `display` and `version` are informational.
///
/// # Examples
///
/// ```
/// use sq2cql_core::term_code::TermCode;
///
/// let code = TermCode::new("http://snomed.info/sct", "13420004", "Diabetes");
/// assert_eq!(code.to_string(), "http://snomed.info/sct|13420004");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermCode {
    system: String,
    code: String,
    #[serde(default)]
    display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

impl TermCode {
    /// Creates a new term code without a system version.
    pub fn new(system: impl Into<String>, code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            display: display.into(),
            version: None,
        }
    }

    /// Returns the same term code pinned to a system version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Returns the code system URI.
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Returns the code within the system.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the human-readable display text.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Returns the code system version, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl PartialEq for TermCode {
    fn eq(&self, other: &Self) -> bool {
        self.system == other.system && self.code == other.code
    }
}

impl Eq for TermCode {}

impl std::hash::Hash for TermCode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.system.hash(state);
        self.code.hash(state);
    }
}

impl fmt::Display for TermCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.system, self.code)
    }
}
