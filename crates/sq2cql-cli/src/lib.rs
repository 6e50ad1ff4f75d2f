//! sq2cql CLI library
//!
//! This module contains the core CLI logic for translating a structured
//! query into CQL: argument resolution, resource loading, the translation
//! pipeline, and routing of results and diagnostics.

pub mod error;
pub mod output;
pub mod resources;

mod args;

pub use args::{
    Args, INPUT_SQ_ARG_NAME, Invocation, OUTPUT_CQL_ARG_NAME, help_requested, normalize, usage,
};

use std::{ffi::OsString, fs, io::Write, path::Path};

use clap::error::ErrorKind;
use log::{debug, info};

use sq2cql::{RetrievalTranslator, Translator, query::StructuredQuery};

use error::{CliError, EXIT_FAILURE, EXIT_SUCCESS, QueryError, RunError};
use resources::Resources;

/// Outcome of command-line parsing.
#[derive(Debug)]
pub enum Startup {
    /// Parsing finished the run (help, version, or an error); exit with this status.
    Exit(i32),
    /// Arguments are valid; continue with [`execute`].
    Proceed(Box<Args>),
}

/// Parses the argument vector, handling help, version, and parse errors.
///
/// `--help` anywhere before a `--` terminator prints the usage to `stdout`
/// and wins over every other argument. Parse errors print the message and
/// the usage to `stderr`.
pub fn parse_args<I, T>(argv: I, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Startup
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();

    if help_requested(&argv) {
        return Startup::Exit(print_info(&usage(), stdout));
    }

    match Args::try_parse_normalized(argv) {
        Ok(args) => Startup::Proceed(Box::new(args)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Startup::Exit(print_info(&err.render().to_string(), stdout))
            }
            _ => Startup::Exit(report(&CliError::Argument(err.into()), stderr)),
        },
    }
}

/// Runs a translation for parsed arguments and returns the exit status.
///
/// The option files are loaded before the positionals are checked, so a
/// broken resource is reported even when the input file is missing.
/// Every error is written to `stderr` as a single line; argument and
/// resource errors are followed by the usage text.
pub fn execute<T>(args: &Args, translator: &T, stdout: &mut dyn Write, stderr: &mut dyn Write) -> i32
where
    T: Translator + ?Sized,
{
    let outcome = Resources::load_files(
        &args.cql_mapping,
        &args.concept_tree,
        args.code_system_aliases.as_deref(),
    )
    .map_err(CliError::from)
    .and_then(|resources| {
        let invocation = args.invocation()?;
        run(&invocation, resources, translator, stdout)?;
        Ok(())
    });

    match outcome {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => report(&err, stderr),
    }
}

/// Parses `argv` and runs the built-in [`RetrievalTranslator`].
///
/// This is the whole command-line program minus logger setup and process exit.
pub fn main_with<I, T>(argv: I, stdout: &mut dyn Write, stderr: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    match parse_args(argv, stdout, stderr) {
        Startup::Exit(code) => code,
        Startup::Proceed(args) => execute(&args, &RetrievalTranslator, stdout, stderr),
    }
}

/// Run the translation pipeline
///
/// This function reads the structured query, builds the translation context
/// from the loaded resources, translates the query, and routes the resulting
/// CQL to the output file or `stdout`. Nothing is written unless the
/// translation succeeded.
///
/// # Arguments
///
/// * `invocation` - Validated input and output paths
/// * `resources` - Loaded mapping resources
/// * `translator` - Translation engine
/// * `stdout` - Destination when no output file is given
///
/// # Errors
///
/// Returns `RunError` for:
/// - Unreadable or invalid structured query files
/// - Translation errors
/// - Output write errors
pub fn run<T>(
    invocation: &Invocation,
    resources: Resources,
    translator: &T,
    stdout: &mut dyn Write,
) -> Result<(), RunError>
where
    T: Translator + ?Sized,
{
    info!(
        input_path:? = invocation.input,
        output_path:? = invocation.output;
        "Processing structured query"
    );

    let query = read_query(&invocation.input)?;

    let context = resources.into_context();
    let cql = translator.translate(&query, &context)?;

    output::write_output(&cql, invocation.output.as_deref(), stdout)?;

    info!("Translation completed");

    Ok(())
}

fn read_query(path: &Path) -> Result<StructuredQuery, QueryError> {
    let content = fs::read_to_string(path).map_err(|source| QueryError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| QueryError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes help or version text to `stdout` and returns the exit status.
fn print_info(text: &str, stdout: &mut dyn Write) -> i32 {
    match write!(stdout, "{text}").and_then(|()| stdout.flush()) {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            debug!("Failed to print help: {err}");
            EXIT_FAILURE
        }
    }
}

/// Writes `err` to `stderr` and returns its exit status.
fn report(err: &CliError, stderr: &mut dyn Write) -> i32 {
    debug!(usage = err.shows_usage(); "Run failed");

    let _ = writeln!(stderr, "{err}");
    if err.shows_usage() {
        let _ = write!(stderr, "{}", usage());
    }

    err.exit_code()
}
