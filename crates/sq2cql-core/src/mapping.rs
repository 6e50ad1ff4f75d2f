//! Concept-to-CQL mapping entries.
//!
//! A mapping file is a JSON array of [`Mapping`] objects. Each entry binds a
//! concept key to the FHIR resource type that is retrieved for it and to the
//! element paths used when the query restricts the concept further.

use serde::{Deserialize, Serialize};

/// A single mapping entry binding a concept key to a CQL retrieve template.
///
/// Unknown fields in the JSON representation are ignored.
///
/// # Examples
///
/// ```
/// use sq2cql_core::mapping::Mapping;
///
/// let mapping: Mapping = serde_json::from_str(
///     r#"{"key": "E11", "resourceType": "Condition", "timeRestrictionFhirPath": "onset"}"#,
/// ).unwrap();
/// assert_eq!(mapping.key(), "E11");
/// assert_eq!(mapping.resource_type(), "Condition");
/// assert_eq!(mapping.time_restriction_path(), Some("onset"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    key: String,
    resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    term_code_fhir_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_restriction_fhir_path: Option<String>,
}

impl Mapping {
    /// Creates a mapping without optional element paths.
    ///
    /// # Arguments
    ///
    /// * `key` - Concept key the mapping is looked up by.
    /// * `resource_type` - FHIR resource type retrieved for the concept.
    pub fn new(key: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            resource_type: resource_type.into(),
            term_code_fhir_path: None,
            time_restriction_fhir_path: None,
        }
    }

    /// Returns the same mapping with the element path used for time restrictions.
    pub fn with_time_restriction_path(mut self, path: impl Into<String>) -> Self {
        self.time_restriction_fhir_path = Some(path.into());
        self
    }

    /// Returns the concept key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the FHIR resource type retrieved for the concept.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the element path holding the concept's code, if configured.
    pub fn term_code_path(&self) -> Option<&str> {
        self.term_code_fhir_path.as_deref()
    }

    /// Returns the element path a time restriction is evaluated against, if configured.
    pub fn time_restriction_path(&self) -> Option<&str> {
        self.time_restriction_fhir_path.as_deref()
    }
}
