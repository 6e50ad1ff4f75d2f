//! Command-line argument definitions for the sq2cql CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`], and the validated [`Invocation`] derived from it. Parsing
//! only produces paths; loading the files they name is a separate step (see
//! [`crate::resources`]).
//!
//! The resource options keep their historical multi-letter short forms
//! (`-cm`, `-ct`, `-csa`). clap short flags are single characters, so those
//! spellings are rewritten to the long forms by [`normalize`] before parsing.

use std::{ffi::OsString, path::PathBuf};

use clap::{CommandFactory, Parser};

use crate::error::ArgumentError;

/// Symbolic name of the input positional argument.
pub const INPUT_SQ_ARG_NAME: &str = "INPUT_SQ_FILE";

/// Symbolic name of the output positional argument.
pub const OUTPUT_CQL_ARG_NAME: &str = "OUTPUT_CQL_FILE";

/// Multi-letter short options and the long options they stand for.
const SHORT_ALIASES: [(&str, &str); 3] = [
    ("-cm", "--cql-mapping"),
    ("-ct", "--concept-tree"),
    ("-csa", "--code-system-aliases"),
];

/// Command-line arguments for the structured query to CQL translator
#[derive(Parser, Debug)]
#[command(
    name = "sq2cql",
    author,
    version,
    about,
    long_about = None,
    override_usage = "sq2cql [OPTS] <INPUT_SQ_FILE> [<OUTPUT_CQL_FILE>]"
)]
pub struct Args {
    /// Path to CQL mapping file [short: -cm]
    #[arg(long = "cql-mapping", value_name = "FILE")]
    pub cql_mapping: PathBuf,

    /// Path to concept tree file [short: -ct]
    #[arg(long = "concept-tree", value_name = "FILE")]
    pub concept_tree: PathBuf,

    /// (Optional) Path to code system aliases file [short: -csa]
    #[arg(long = "code-system-aliases", value_name = "FILE")]
    pub code_system_aliases: Option<PathBuf>,

    /// Path to the input structured query file
    #[arg(value_name = INPUT_SQ_ARG_NAME)]
    pub input: Option<PathBuf>,

    /// Path to the output CQL file; standard output if omitted
    #[arg(value_name = OUTPUT_CQL_ARG_NAME)]
    pub output: Option<PathBuf>,

    /// Positional arguments beyond the output file are accepted and ignored
    #[arg(hide = true, value_name = "IGNORED")]
    pub ignored: Vec<OsString>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// Parses a full argument vector, program name included.
    ///
    /// Multi-letter short options are normalized first.
    ///
    /// # Errors
    ///
    /// Returns the [`clap::Error`] for unknown options, missing required
    /// options, missing option values, and for `--help`/`--version` requests.
    pub fn try_parse_normalized<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize(argv))
    }

    /// Validates the positional arguments and builds the [`Invocation`].
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::MissingPositional`] if no input file was given.
    pub fn invocation(&self) -> Result<Invocation, ArgumentError> {
        let input = self
            .input
            .clone()
            .ok_or(ArgumentError::MissingPositional(INPUT_SQ_ARG_NAME))?;

        Ok(Invocation {
            cql_mapping: self.cql_mapping.clone(),
            concept_tree: self.concept_tree.clone(),
            code_system_aliases: self.code_system_aliases.clone(),
            input,
            output: self.output.clone(),
        })
    }
}

/// A validated single run of the translator.
///
/// Holds paths only; no file has been opened yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Path to the CQL mapping file.
    pub cql_mapping: PathBuf,
    /// Path to the concept tree file.
    pub concept_tree: PathBuf,
    /// Path to the code system aliases file; `None` means no aliases.
    pub code_system_aliases: Option<PathBuf>,
    /// Path to the structured query file.
    pub input: PathBuf,
    /// Path to the output CQL file; `None` means standard output.
    pub output: Option<PathBuf>,
}

/// Returns `true` if `-h` or `--help` appears anywhere before a `--` terminator.
///
/// The program name (first element) is skipped. Help wins over every other
/// argument, valid or not.
pub fn help_requested<T: AsRef<std::ffi::OsStr>>(argv: &[T]) -> bool {
    argv.iter()
        .skip(1)
        .map(AsRef::as_ref)
        .take_while(|arg| *arg != "--")
        .any(|arg| arg == "-h" || arg == "--help")
}

/// Rewrites `-cm`, `-ct` and `-csa` (optionally followed by `=FILE`) to their
/// long forms. Arguments after a `--` terminator are left untouched.
pub fn normalize<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut terminated = false;

    argv.into_iter()
        .map(Into::into)
        .map(|arg| {
            if terminated {
                return arg;
            }
            if arg == "--" {
                terminated = true;
                return arg;
            }
            if let Some(expanded) = arg.to_str().and_then(expand_short_alias) {
                return OsString::from(expanded);
            }
            arg
        })
        .collect()
}

fn expand_short_alias(arg: &str) -> Option<String> {
    SHORT_ALIASES.iter().find_map(|(short, long)| {
        let rest = arg.strip_prefix(short)?;
        if rest.is_empty() {
            Some(long.to_string())
        } else {
            rest.strip_prefix('=').map(|value| format!("{long}={value}"))
        }
    })
}

/// Renders the full help text.
pub fn usage() -> String {
    Args::command().render_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_normalized(std::iter::once("sq2cql").chain(args.iter().copied()))
    }

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_short_aliases() {
        let args = parse(&["-cm", "m.json", "-ct", "t.json", "-csa", "a.json", "in.json"]).unwrap();
        assert_eq!(args.cql_mapping, PathBuf::from("m.json"));
        assert_eq!(args.concept_tree, PathBuf::from("t.json"));
        assert_eq!(args.code_system_aliases, Some(PathBuf::from("a.json")));
        assert_eq!(args.input, Some(PathBuf::from("in.json")));
        assert_eq!(args.output, None);
    }

    #[test]
    fn test_long_options_and_equals_syntax() {
        let args = parse(&["--cql-mapping=m.json", "-ct=t.json", "in.json", "out.cql"]).unwrap();
        assert_eq!(args.cql_mapping, PathBuf::from("m.json"));
        assert_eq!(args.concept_tree, PathBuf::from("t.json"));
        assert_eq!(args.code_system_aliases, None);
        assert_eq!(args.output, Some(PathBuf::from("out.cql")));
    }

    #[test]
    fn test_missing_required_option() {
        let err = parse(&["-cm", "m.json", "in.json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let err = parse(&["-ct", "t.json", "in.json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert!(err.to_string().contains("--cql-mapping"));
    }

    #[test]
    fn test_extra_positionals_are_ignored() {
        let args = parse(&["-cm", "m", "-ct", "t", "in", "out", "extra1", "extra2"]).unwrap();
        let invocation = args.invocation().unwrap();
        assert_eq!(invocation.input, PathBuf::from("in"));
        assert_eq!(invocation.output, Some(PathBuf::from("out")));
        assert_eq!(args.ignored.len(), 2);
    }

    #[test]
    fn test_missing_input_positional() {
        let args = parse(&["-cm", "m.json", "-ct", "t.json"]).unwrap();
        let err = args.invocation().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required positional argument INPUT_SQ_FILE"
        );
    }

    #[test]
    fn test_help_requested() {
        assert!(help_requested(&["sq2cql", "--bogus", "-h"]));
        assert!(help_requested(&["sq2cql", "-cm", "m.json", "--help"]));
        assert!(!help_requested(&["sq2cql", "-cm", "m.json"]));
        assert!(!help_requested(&["sq2cql", "--", "--help"]));
        assert!(!help_requested(&["--help"]));
    }

    #[test]
    fn test_normalize_leaves_other_arguments() {
        let normalized = normalize(["sq2cql", "-cmx", "-ct", "--", "-csa"]);
        assert_eq!(
            normalized,
            ["sq2cql", "-cmx", "--concept-tree", "--", "-csa"]
                .map(OsString::from)
                .to_vec()
        );
    }

    #[test]
    fn test_usage_mentions_options() {
        let text = usage();
        assert!(text.contains("INPUT_SQ_FILE"));
        assert!(text.contains("--cql-mapping <FILE>"));
        assert!(text.contains("-csa"));
    }
}
