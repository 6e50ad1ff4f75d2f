//! Error types for the CLI.
//!
//! Every failure of a run falls into one of these categories:
//!
//! - [`ArgumentError`] - malformed or missing options and positionals.
//! - [`ResourceError`] - a mapping resource could not be read or deserialized.
//! - [`RunError`] - the query could not be read, translated, or written.
//!
//! All of them are terminal. [`CliError`] collects them at the outermost
//! boundary, where each is printed as a single line on standard error.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use sq2cql::TranslationError;

/// Exit status for a failed run.
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for a successful run.
pub const EXIT_SUCCESS: i32 = 0;

/// Malformed or missing command-line arguments.
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("{0}")]
    Parse(String),

    #[error("Missing required positional argument {0}")]
    MissingPositional(&'static str),
}

impl From<clap::Error> for ArgumentError {
    fn from(err: clap::Error) -> Self {
        // Usage and the `--help` hint are printed separately
        let rendered = err.render().to_string();
        let message = rendered
            .split("\n\nUsage:")
            .next()
            .unwrap_or(&rendered)
            .trim_end();
        let message = message.strip_prefix("error: ").unwrap_or(message);
        Self::Parse(message.to_string())
    }
}

/// The mapping resource a [`ResourceError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    CqlMapping,
    ConceptTree,
    CodeSystemAliases,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CqlMapping => "CQL mapping",
            Self::ConceptTree => "concept tree",
            Self::CodeSystemAliases => "code system aliases",
        })
    }
}

/// A mapping resource that could not be loaded.
#[derive(Debug, Error)]
#[error("Failed to load {kind} file {}: {source}", path.display())]
pub struct ResourceError {
    kind: ResourceKind,
    path: PathBuf,
    source: ResourceErrorSource,
}

impl ResourceError {
    pub fn new(kind: ResourceKind, path: impl Into<PathBuf>, source: impl Into<ResourceErrorSource>) -> Self {
        Self {
            kind,
            path: path.into(),
            source: source.into(),
        }
    }

    /// Returns which resource failed to load.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

/// Underlying cause of a [`ResourceError`].
#[derive(Debug, Error)]
pub enum ResourceErrorSource {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// The structured query file could not be read or deserialized.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Failed to read structured query file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid structured query file {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The translation result could not be written.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write to output file {}: {source}", path.display())]
    File { path: PathBuf, source: io::Error },

    #[error("Failed to write to standard output: {0}")]
    Stdout(io::Error),
}

/// Failure of the translation pipeline after the arguments were resolved.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Translation failed: {0}")]
    Query(#[from] QueryError),

    #[error("Translation failed: {0}")]
    Translation(#[from] TranslationError),

    #[error("{0}")]
    Output(#[from] OutputError),
}

/// Any failure of a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Run(#[from] RunError),
}

impl CliError {
    /// Returns `true` if the usage text should follow the error message.
    pub fn shows_usage(&self) -> bool {
        matches!(self, Self::Argument(_) | Self::Resource(_))
    }

    /// Returns the process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}
