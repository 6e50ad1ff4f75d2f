//! Structured cohort queries.
//!
//! A structured query selects patients through nested criteria groups:
//!
//! - Criteria within a group are alternatives (OR).
//! - Inclusion groups must all hold (AND).
//! - A patient is excluded when any exclusion group holds entirely; within
//!   an exclusion group the criteria are conjunctive.
//!
//! The value and attribute filter payloads are kept as raw JSON so that a
//! translator can reject what it does not understand instead of silently
//! dropping it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::term_code::TermCode;

/// A structured cohort query document.
///
/// # Examples
///
/// ```
/// use sq2cql_core::query::StructuredQuery;
///
/// let query: StructuredQuery = serde_json::from_str(r#"{
///     "version": "http://to_be_decided.com/draft-2/schema#",
///     "inclusionCriteria": [[
///         {"termCodes": [{"system": "http://snomed.info/sct", "code": "13420004", "display": "Diabetes"}]}
///     ]]
/// }"#).unwrap();
///
/// assert_eq!(query.inclusion_criteria().len(), 1);
/// assert!(query.exclusion_criteria().is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display: Option<String>,
    inclusion_criteria: Vec<Vec<Criterion>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    exclusion_criteria: Vec<Vec<Criterion>>,
}

impl StructuredQuery {
    /// Creates a query from inclusion and exclusion groups.
    pub fn new(inclusion_criteria: Vec<Vec<Criterion>>, exclusion_criteria: Vec<Vec<Criterion>>) -> Self {
        Self {
            version: None,
            display: None,
            inclusion_criteria,
            exclusion_criteria,
        }
    }

    /// Returns the schema version the query was written against.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the display name of the query.
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// Returns the inclusion groups.
    pub fn inclusion_criteria(&self) -> &[Vec<Criterion>] {
        &self.inclusion_criteria
    }

    /// Returns the exclusion groups; empty when the query excludes nothing.
    pub fn exclusion_criteria(&self) -> &[Vec<Criterion>] {
        &self.exclusion_criteria
    }
}

/// A single selection criterion over one or more concepts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<TermCode>,
    #[serde(default)]
    term_codes: Vec<TermCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_restriction: Option<TimeRestriction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value_filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attribute_filters: Vec<Value>,
}

impl Criterion {
    /// Creates a criterion matching any of the given concepts.
    pub fn new(term_codes: Vec<TermCode>) -> Self {
        Self {
            term_codes,
            ..Self::default()
        }
    }

    /// Returns the same criterion restricted to a time window.
    pub fn with_time_restriction(mut self, restriction: TimeRestriction) -> Self {
        self.time_restriction = Some(restriction);
        self
    }

    /// Returns the same criterion carrying a raw value filter.
    pub fn with_value_filter(mut self, filter: Value) -> Self {
        self.value_filter = Some(filter);
        self
    }

    /// Returns the context the concepts are used in, if given.
    pub fn context(&self) -> Option<&TermCode> {
        self.context.as_ref()
    }

    /// Returns the concepts the criterion matches.
    pub fn term_codes(&self) -> &[TermCode] {
        &self.term_codes
    }

    /// Returns the time window the criterion is restricted to, if any.
    pub fn time_restriction(&self) -> Option<&TimeRestriction> {
        self.time_restriction.as_ref()
    }

    /// Returns the raw value filter, if any.
    pub fn value_filter(&self) -> Option<&Value> {
        self.value_filter.as_ref()
    }

    /// Returns the raw attribute filters.
    pub fn attribute_filters(&self) -> &[Value] {
        &self.attribute_filters
    }
}

/// A closed date window; either bound may be open.
///
/// Dates are ISO-8601 calendar dates (`YYYY-MM-DD`) and are passed through
/// to CQL unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRestriction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    after_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    before_date: Option<String>,
}

impl TimeRestriction {
    /// Creates a time window from optional lower and upper bounds.
    pub fn new(after_date: Option<String>, before_date: Option<String>) -> Self {
        Self {
            after_date,
            before_date,
        }
    }

    /// Returns the lower bound.
    pub fn after_date(&self) -> Option<&str> {
        self.after_date.as_deref()
    }

    /// Returns the upper bound.
    pub fn before_date(&self) -> Option<&str> {
        self.before_date.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusion_criteria_are_required() {
        let result = serde_json::from_str::<StructuredQuery>(r#"{"version": "1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_full_criterion() {
        let json = r#"{
            "display": "Diabetics with HbA1c",
            "inclusionCriteria": [[{
                "context": {"system": "fdpg.mii.cds", "code": "Laboruntersuchung", "display": "Lab"},
                "termCodes": [{"system": "http://loinc.org", "code": "4548-4", "display": "HbA1c"}],
                "timeRestriction": {"afterDate": "2023-01-01", "beforeDate": "2023-12-31"},
                "valueFilter": {"type": "quantity-comparator", "comparator": "gt", "value": 6.5}
            }]],
            "exclusionCriteria": [[
                {"termCodes": [{"system": "http://snomed.info/sct", "code": "77386006", "display": "Pregnancy"}]}
            ]]
        }"#;

        let query: StructuredQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.display(), Some("Diabetics with HbA1c"));

        let criterion = &query.inclusion_criteria()[0][0];
        assert_eq!(criterion.context().map(TermCode::code), Some("Laboruntersuchung"));
        assert_eq!(criterion.term_codes()[0].code(), "4548-4");
        assert_eq!(
            criterion.time_restriction(),
            Some(&TimeRestriction::new(
                Some("2023-01-01".to_string()),
                Some("2023-12-31".to_string())
            ))
        );
        assert!(criterion.value_filter().is_some());
        assert!(criterion.attribute_filters().is_empty());

        assert_eq!(query.exclusion_criteria().len(), 1);
    }
}
