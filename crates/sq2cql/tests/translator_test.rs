//! Integration tests for the built-in retrieval translator
//!
//! These tests load mapping resources from JSON the same way the CLI does and
//! compare the complete printed library.

use std::collections::HashMap;

use sq2cql::{
    CodeSystemAliases, ConceptTree, MappingContext, MappingTable, RetrievalTranslator,
    TranslationError, Translator, mapping::Mapping, query::StructuredQuery,
    tree::MappingTreeModuleRoot,
};

const MAPPINGS: &str = r#"[
    {"key": "E10-E14", "resourceType": "Condition", "timeRestrictionFhirPath": "recordedDate"},
    {"key": "122555007", "resourceType": "Specimen"},
    {"key": "119298005", "resourceType": "Specimen"},
    {"key": "77386006", "resourceType": "Condition"},
    {"key": "77386006", "resourceType": "Observation"}
]"#;

const TREE: &str = r#"[
    {
        "context": {"system": "fdpg.mii.cds", "code": "Diagnose", "display": "Diagnose"},
        "system": "http://fhir.de/CodeSystem/bfarm/icd-10-gm",
        "entries": [
            {"key": "E10-E14", "children": ["E10", "E11"]},
            {"key": "E10", "parents": ["E10-E14"]},
            {"key": "E11", "parents": ["E10-E14"]}
        ]
    }
]"#;

const ALIASES: &str = r#"{
    "icd10": "http://fhir.de/CodeSystem/bfarm/icd-10-gm",
    "snomed": "http://snomed.info/sct"
}"#;

fn context(aliases: &str) -> MappingContext {
    let mappings: Vec<Mapping> = serde_json::from_str(MAPPINGS).expect("valid mappings");
    let roots: Vec<MappingTreeModuleRoot> = serde_json::from_str(TREE).expect("valid tree");
    let aliases: HashMap<String, String> = serde_json::from_str(aliases).expect("valid aliases");

    MappingContext::new(
        MappingTable::from_entries(mappings),
        ConceptTree::new(roots),
        CodeSystemAliases::from(aliases),
    )
}

fn query(json: &str) -> StructuredQuery {
    serde_json::from_str(json).expect("valid structured query")
}

#[test]
fn test_translate_with_tree_expansion_and_exclusion() {
    let sq = query(
        r#"{
            "version": "http://to_be_decided.com/draft-2/schema#",
            "inclusionCriteria": [
                [{"termCodes": [{"system": "http://fhir.de/CodeSystem/bfarm/icd-10-gm", "code": "E10-E14", "display": "Diabetes"}]}],
                [
                    {"termCodes": [{"system": "http://snomed.info/sct", "code": "122555007", "display": "Blood"}]},
                    {"termCodes": [{"system": "http://snomed.info/sct", "code": "119298005", "display": "Serum"}]}
                ]
            ],
            "exclusionCriteria": [
                [{"termCodes": [{"system": "http://snomed.info/sct", "code": "77386006", "display": "Pregnancy"}]}]
            ]
        }"#,
    );

    let cql = RetrievalTranslator
        .translate(&sq, &context(ALIASES))
        .expect("Failed to translate");

    let expected = "\
library Retrieve version '1.0.0'
using FHIR version '4.0.0'
include FHIRHelpers version '4.0.0'

codesystem icd10: 'http://fhir.de/CodeSystem/bfarm/icd-10-gm'
codesystem snomed: 'http://snomed.info/sct'

context Patient

define Inclusion:
  (exists [Condition: Code 'E10-E14' from icd10] or
   exists [Condition: Code 'E10' from icd10] or
   exists [Condition: Code 'E11' from icd10]) and
  (exists [Specimen: Code '122555007' from snomed] or
   exists [Specimen: Code '119298005' from snomed])

define Exclusion:
  exists [Condition: Code '77386006' from snomed]

define InInitialPopulation:
  Inclusion and
  not Exclusion";

    assert_eq!(cql, expected);
}

#[test]
fn test_translate_without_aliases_derives_code_system_names() {
    let sq = query(
        r#"{"inclusionCriteria": [[
            {"termCodes": [{"system": "http://snomed.info/sct", "code": "122555007", "display": "Blood"}]}
        ]]}"#,
    );

    let cql = RetrievalTranslator
        .translate(&sq, &context("{}"))
        .expect("Failed to translate");

    assert!(cql.contains("codesystem sct: 'http://snomed.info/sct'"));
    assert!(cql.contains("define Inclusion:\n  exists [Specimen: Code '122555007' from sct]"));
    assert!(cql.ends_with("define InInitialPopulation:\n  Inclusion"));
    assert!(!cql.contains("Exclusion"));
}

#[test]
fn test_configured_alias_is_not_taken_by_derived_alias() {
    let mappings = vec![Mapping::new("x", "Condition"), Mapping::new("y", "Specimen")];
    let aliases = HashMap::from([("sct".to_string(), "http://snomed.info/sct".to_string())]);
    let ctx = MappingContext::new(
        MappingTable::from_entries(mappings),
        ConceptTree::default(),
        CodeSystemAliases::from(aliases),
    );
    let sq = query(
        r#"{"inclusionCriteria": [
            [{"termCodes": [{"system": "http://example.org/sct", "code": "x"}]}],
            [{"termCodes": [{"system": "http://snomed.info/sct", "code": "y"}]}]
        ]}"#,
    );

    let cql = RetrievalTranslator
        .translate(&sq, &ctx)
        .expect("Failed to translate");

    assert!(cql.contains("codesystem sct: 'http://snomed.info/sct'"), "{cql}");
    assert!(cql.contains("codesystem sct2: 'http://example.org/sct'"), "{cql}");
    assert!(cql.contains("exists [Condition: Code 'x' from sct2]"));
    assert!(cql.contains("exists [Specimen: Code 'y' from sct]"));
}

#[test]
fn test_time_restriction_applies_to_expanded_codes() {
    let sq = query(
        r#"{"inclusionCriteria": [[{
            "termCodes": [{"system": "http://fhir.de/CodeSystem/bfarm/icd-10-gm", "code": "E10-E14", "display": "Diabetes"}],
            "timeRestriction": {"afterDate": "2024-02-21", "beforeDate": "2024-02-21"}
        }]]}"#,
    );

    let cql = RetrievalTranslator
        .translate(&sq, &context(ALIASES))
        .expect("Failed to translate");

    for code in ["E10-E14", "E10", "E11"] {
        let retrieve = format!(
            "exists (from [Condition: Code '{code}' from icd10] R\n    \
             where ToDate(R.recordedDate as dateTime) in Interval[@2024-02-21T, @2024-02-21T])"
        );
        assert!(cql.contains(&retrieve), "missing retrieve for {code}:\n{cql}");
    }
}

#[test]
fn test_attribute_filters_are_rejected() {
    let sq = query(
        r#"{"inclusionCriteria": [[{
            "termCodes": [{"system": "http://snomed.info/sct", "code": "122555007", "display": "Blood"}],
            "attributeFilters": [{"type": "concept", "attributeCode": {"system": "s", "code": "c"}}]
        }]]}"#,
    );

    let result = RetrievalTranslator.translate(&sq, &context(ALIASES));
    assert_eq!(
        result,
        Err(TranslationError::UnsupportedFilter {
            kind: "attribute filter",
            key: "122555007".to_string()
        })
    );
}

#[test]
fn test_translator_is_reusable_across_queries() {
    let ctx = context(ALIASES);
    let first = query(
        r#"{"inclusionCriteria": [[{"termCodes": [{"system": "http://snomed.info/sct", "code": "122555007"}]}]]}"#,
    );
    let second = query(
        r#"{"inclusionCriteria": [[{"termCodes": [{"system": "http://snomed.info/sct", "code": "119298005"}]}]]}"#,
    );

    let cql1 = RetrievalTranslator.translate(&first, &ctx).expect("first");
    let cql2 = RetrievalTranslator.translate(&second, &ctx).expect("second");

    assert!(cql1.contains("'122555007'") && !cql1.contains("'119298005'"));
    assert!(cql2.contains("'119298005'") && !cql2.contains("'122555007'"));
}
