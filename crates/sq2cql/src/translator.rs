//! Structured query translation.
//!
//! [`Translator`] is the seam between the command-line pipeline and the
//! engine that turns a [`StructuredQuery`] into CQL text.
//! [`RetrievalTranslator`] is the built-in engine: it expresses every
//! criterion as coded `exists` retrieves, expanding each concept to its
//! descendants through the concept tree.

use log::{debug, info, trace};

use sq2cql_core::{
    mapping::Mapping,
    query::{Criterion, StructuredQuery},
};

use crate::{
    context::MappingContext,
    cql::{self, Expression, Library, Retrieve},
    error::TranslationError,
};

/// Converts structured queries into printable CQL.
pub trait Translator {
    /// Translates `query` using the mappings, concept tree and aliases of `context`.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError`] if the query cannot be expressed with
    /// the given context.
    fn translate(
        &self,
        query: &StructuredQuery,
        context: &MappingContext,
    ) -> Result<String, TranslationError>;
}

/// Translator emitting coded retrieves for every criterion.
///
/// Supports term codes and time restrictions. Value and attribute filters
/// are rejected with [`TranslationError::UnsupportedFilter`].
///
/// # Examples
///
/// ```
/// use sq2cql::{MappingContext, MappingTable, RetrievalTranslator, Translator};
/// use sq2cql_core::{mapping::Mapping, query::{Criterion, StructuredQuery}, term_code::TermCode};
///
/// let context = MappingContext::new(
///     MappingTable::from_entries(vec![Mapping::new("13420004", "Condition")]),
///     Default::default(),
///     Default::default(),
/// );
/// let query = StructuredQuery::new(
///     vec![vec![Criterion::new(vec![TermCode::new("http://snomed.info/sct", "13420004", "Diabetes")])]],
///     Vec::new(),
/// );
///
/// let cql = RetrievalTranslator.translate(&query, &context).unwrap();
/// assert!(cql.contains("exists [Condition: Code '13420004' from sct]"));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct RetrievalTranslator;

impl Translator for RetrievalTranslator {
    fn translate(
        &self,
        query: &StructuredQuery,
        context: &MappingContext,
    ) -> Result<String, TranslationError> {
        info!(
            inclusion_groups = query.inclusion_criteria().len(),
            exclusion_groups = query.exclusion_criteria().len();
            "Translating structured query"
        );

        let mut library = Library::with_reserved(context.aliases().iter());

        let inclusion = query
            .inclusion_criteria()
            .iter()
            .enumerate()
            .filter(|(_, group)| !group.is_empty())
            .map(|(idx, group)| {
                let criteria = translate_group(group, "inclusion", idx, context, &mut library)?;
                Ok(Expression::or(criteria))
            })
            .collect::<Result<Vec<_>, TranslationError>>()?;

        if inclusion.is_empty() {
            return Err(TranslationError::EmptyInclusion);
        }

        let exclusion = query
            .exclusion_criteria()
            .iter()
            .enumerate()
            .filter(|(_, group)| !group.is_empty())
            .map(|(idx, group)| {
                let criteria = translate_group(group, "exclusion", idx, context, &mut library)?;
                Ok(Expression::and(criteria))
            })
            .collect::<Result<Vec<_>, TranslationError>>()?;

        library.define("Inclusion", Expression::and(inclusion));

        let population = if exclusion.is_empty() {
            Expression::Ref("Inclusion".to_string())
        } else {
            library.define("Exclusion", Expression::or(exclusion));
            Expression::and(vec![
                Expression::Ref("Inclusion".to_string()),
                Expression::not(Expression::Ref("Exclusion".to_string())),
            ])
        };
        library.define("InInitialPopulation", population);

        let cql = library.to_string();
        debug!("Structured query translated successfully");
        trace!(cql = cql.as_str(); "Translated CQL");

        Ok(cql)
    }
}

fn translate_group(
    group: &[Criterion],
    section: &'static str,
    idx: usize,
    context: &MappingContext,
    library: &mut Library,
) -> Result<Vec<Expression>, TranslationError> {
    group
        .iter()
        .map(|criterion| translate_criterion(criterion, section, idx + 1, context, library))
        .collect()
}

fn translate_criterion(
    criterion: &Criterion,
    section: &'static str,
    group: usize,
    context: &MappingContext,
    library: &mut Library,
) -> Result<Expression, TranslationError> {
    let Some(first) = criterion.term_codes().first() else {
        return Err(TranslationError::MissingTermCodes { section, group });
    };

    if criterion.value_filter().is_some() {
        return Err(TranslationError::UnsupportedFilter {
            kind: "value filter",
            key: first.code().to_string(),
        });
    }
    if !criterion.attribute_filters().is_empty() {
        return Err(TranslationError::UnsupportedFilter {
            kind: "attribute filter",
            key: first.code().to_string(),
        });
    }

    let mut operands: Vec<Expression> = Vec::new();

    for term_code in criterion.term_codes() {
        let system = term_code.system();
        let codes = context
            .concept_tree()
            .descendants_or_self(system, term_code.code())
            .unwrap_or_else(|| {
                debug!(system, code = term_code.code(); "Concept not in tree, using it unexpanded");
                vec![term_code.code().to_string()]
            });

        let preferred = context
            .aliases()
            .alias_for(system)
            .map(str::to_string)
            .unwrap_or_else(|| cql::derive_alias(system));
        let alias = library.code_system(system, &preferred);

        // Descendants without a mapping of their own use the referenced concept's
        let fallback = context.mappings().get(term_code.code());

        for code in codes {
            let expression = retrieve_expression(criterion, context, fallback, &code, &alias)?;
            if !operands.contains(&expression) {
                operands.push(expression);
            }
        }
    }

    Ok(Expression::or(operands))
}

fn retrieve_expression(
    criterion: &Criterion,
    context: &MappingContext,
    fallback: Option<&Mapping>,
    code: &str,
    alias: &str,
) -> Result<Expression, TranslationError> {
    let mapping = context
        .mappings()
        .get(code)
        .or(fallback)
        .ok_or_else(|| TranslationError::MappingNotFound {
            key: code.to_string(),
        })?;

    let retrieve = Retrieve::new(mapping.resource_type(), code, alias);

    let Some(restriction) = criterion.time_restriction() else {
        return Ok(Expression::Exists(retrieve));
    };

    let path = mapping
        .time_restriction_path()
        .ok_or_else(|| TranslationError::TimeRestrictionNotMapped {
            key: code.to_string(),
        })?;

    Ok(Expression::ExistsInInterval {
        retrieve,
        path: path.to_string(),
        start: restriction
            .after_date()
            .unwrap_or(cql::OPEN_LOWER_BOUND)
            .to_string(),
        end: restriction
            .before_date()
            .unwrap_or(cql::OPEN_UPPER_BOUND)
            .to_string(),
    })
}
