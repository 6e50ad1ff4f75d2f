//! Minimal CQL syntax tree and printer.
//!
//! The translator builds a [`Library`] out of [`Expression`] values and
//! prints it through its [`Display`](fmt::Display) implementation. Only the
//! constructs the retrieval translator emits are modelled.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

/// Library, model and helper declarations every translation starts with.
const LIBRARY_HEADER: &str = "library Retrieve version '1.0.0'\n\
                              using FHIR version '4.0.0'\n\
                              include FHIRHelpers version '4.0.0'";

/// Lower bound used when a time restriction has no `afterDate`.
pub(crate) const OPEN_LOWER_BOUND: &str = "1900-01-01";

/// Upper bound used when a time restriction has no `beforeDate`.
pub(crate) const OPEN_UPPER_BOUND: &str = "2040-01-01";

/// CQL keywords that cannot be used as a bare code system identifier.
const RESERVED_WORDS: &[&str] = &[
    "after", "all", "and", "as", "asc", "before", "between", "by", "case", "code",
    "codesystem", "concept", "contains", "context", "define", "desc", "difference",
    "distinct", "div", "during", "else", "end", "ends", "except", "exists", "false",
    "from", "function", "if", "implies", "in", "include", "includes", "interval",
    "intersect", "is", "let", "library", "list", "maximum", "minimum", "mod", "not",
    "null", "occurs", "of", "or", "overlaps", "parameter", "properly", "public",
    "private", "return", "same", "singleton", "sort", "starts", "such", "that",
    "then", "to", "true", "tuple", "union", "using", "valueset", "version", "when",
    "where", "with", "within", "without", "xor",
];

/// A coded retrieve such as `[Condition: Code 'E11' from icd10]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieve {
    resource_type: String,
    code: String,
    code_system: String,
}

impl Retrieve {
    pub fn new(
        resource_type: impl Into<String>,
        code: impl Into<String>,
        code_system: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            code: code.into(),
            code_system: code_system.into(),
        }
    }
}

impl fmt::Display for Retrieve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}: Code {} from {}]",
            self.resource_type,
            quote(&self.code),
            self.code_system
        )
    }
}

/// A boolean CQL expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// `exists <retrieve>`
    Exists(Retrieve),
    /// `exists (from <retrieve> R where ToDate(R.<path> as dateTime) in Interval[...])`
    ExistsInInterval {
        retrieve: Retrieve,
        path: String,
        start: String,
        end: String,
    },
    /// Reference to a named definition.
    Ref(String),
    Not(Box<Expression>),
    And(Vec<Expression>),
    Or(Vec<Expression>),
}

impl Expression {
    /// Conjunction of `operands`, collapsed when there is only one.
    ///
    /// Nested conjunctions are flattened into this one.
    pub fn and(operands: Vec<Expression>) -> Self {
        let flat = operands
            .into_iter()
            .flat_map(|op| match op {
                Self::And(inner) => inner,
                other => vec![other],
            })
            .collect();
        Self::collapse(flat, Self::And)
    }

    /// Disjunction of `operands`, collapsed when there is only one.
    ///
    /// Nested disjunctions are flattened into this one.
    pub fn or(operands: Vec<Expression>) -> Self {
        let flat = operands
            .into_iter()
            .flat_map(|op| match op {
                Self::Or(inner) => inner,
                other => vec![other],
            })
            .collect();
        Self::collapse(flat, Self::Or)
    }

    pub fn not(operand: Expression) -> Self {
        Self::Not(Box::new(operand))
    }

    fn collapse(mut operands: Vec<Expression>, wrap: fn(Vec<Expression>) -> Expression) -> Self {
        if operands.len() == 1 {
            operands.remove(0)
        } else {
            wrap(operands)
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Self::And(ops) | Self::Or(ops) if ops.len() > 1)
    }

    /// Writes the expression; continuation lines are indented by `indent` spaces.
    fn write(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            Self::Exists(retrieve) => write!(f, "exists {retrieve}"),
            Self::ExistsInInterval {
                retrieve,
                path,
                start,
                end,
            } => {
                writeln!(f, "exists (from {retrieve} R")?;
                write!(
                    f,
                    "{:indent$}  where ToDate(R.{path} as dateTime) in Interval[@{start}T, @{end}T])",
                    ""
                )
            }
            Self::Ref(name) => f.write_str(name),
            Self::Not(operand) => {
                f.write_str("not ")?;
                operand.write_operand(f, indent + 4)
            }
            Self::And(operands) => Self::write_chain(f, operands, "and", indent),
            Self::Or(operands) => Self::write_chain(f, operands, "or", indent),
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        if self.is_compound() {
            f.write_str("(")?;
            self.write(f, indent + 1)?;
            f.write_str(")")
        } else {
            self.write(f, indent)
        }
    }

    fn write_chain(
        f: &mut fmt::Formatter<'_>,
        operands: &[Expression],
        operator: &str,
        indent: usize,
    ) -> fmt::Result {
        for (idx, operand) in operands.iter().enumerate() {
            if idx > 0 {
                write!(f, " {operator}\n{:indent$}", "")?;
            }
            operand.write_operand(f, indent)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}

/// A printable CQL library.
#[derive(Debug, Default)]
pub struct Library {
    /// alias -> URI, printed in alias order
    code_systems: BTreeMap<String, String>,
    /// URI -> alias
    aliases: HashMap<String, String>,
    /// Configured alias -> URI; never handed to another system
    reserved: HashMap<String, String>,
    definitions: Vec<(String, Expression)>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a library in which each configured alias is kept for its own URI.
    pub fn with_reserved<'a>(aliases: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            reserved: aliases
                .into_iter()
                .map(|(alias, uri)| (alias.to_string(), uri.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// Declares the code system `uri` and returns the alias to reference it by.
    ///
    /// The `preferred` alias is used unless another system already claimed
    /// it or it is reserved for another system, in which case a numeric
    /// suffix is appended.
    pub fn code_system(&mut self, uri: &str, preferred: &str) -> String {
        if let Some(alias) = self.aliases.get(uri) {
            return alias.clone();
        }

        let mut alias = preferred.to_string();
        let mut suffix = 1;
        while !self.is_available(&alias, uri) {
            suffix += 1;
            alias = format!("{preferred}{suffix}");
        }

        self.code_systems.insert(alias.clone(), uri.to_string());
        self.aliases.insert(uri.to_string(), alias.clone());
        alias
    }

    fn is_available(&self, alias: &str, uri: &str) -> bool {
        !self.code_systems.contains_key(alias)
            && self.reserved.get(alias).is_none_or(|owner| owner.as_str() == uri)
    }

    /// Appends a named definition.
    pub fn define(&mut self, name: impl Into<String>, expression: Expression) {
        self.definitions.push((name.into(), expression));
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(LIBRARY_HEADER)?;

        if !self.code_systems.is_empty() {
            f.write_str("\n")?;
            for (alias, uri) in &self.code_systems {
                write!(f, "\ncodesystem {alias}: {}", quote(uri))?;
            }
        }

        f.write_str("\n\ncontext Patient")?;

        for (name, expression) in &self.definitions {
            write!(f, "\n\ndefine {name}:\n  ")?;
            expression.write(f, 2)?;
        }

        Ok(())
    }
}

/// Quotes `value` as a CQL string literal.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Derives an alias for a code system URI without a configured alias.
///
/// Uses the last path or URN segment, lower-cased, with every character
/// outside `[a-z0-9]` replaced by `_`. Empty, digit-leading and keyword
/// segments get a `cs` prefix.
pub(crate) fn derive_alias(uri: &str) -> String {
    let segment = uri
        .trim_end_matches(['/', ':'])
        .rsplit(['/', ':'])
        .next()
        .unwrap_or_default();

    let mut alias: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    if alias.is_empty()
        || alias.starts_with(|c: char| c.is_ascii_digit())
        || RESERVED_WORDS.contains(&alias.as_str())
    {
        alias.insert_str(0, "cs");
    }
    alias
}
