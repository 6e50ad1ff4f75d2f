//! Output routing for the translation result.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use crate::error::OutputError;

/// Writes the translated CQL to `path`, or to `stdout` when no path is given.
///
/// A file receives the text exactly as produced. Standard output receives
/// the text followed by a single newline.
///
/// # Errors
///
/// Returns [`OutputError`] if the file cannot be created or written, or if
/// writing to `stdout` fails.
pub fn write_output(cql: &str, path: Option<&Path>, stdout: &mut dyn Write) -> Result<(), OutputError> {
    match path {
        Some(path) => {
            write_file(path, cql).map_err(|source| OutputError::File {
                path: path.to_path_buf(),
                source,
            })?;
            info!(output_file:? = path; "CQL written to file");
        }
        None => {
            writeln!(stdout, "{cql}")
                .and_then(|()| stdout.flush())
                .map_err(OutputError::Stdout)?;
        }
    }
    Ok(())
}

/// Creates or truncates `path` and writes `content` to it.
///
/// The file handle is dropped when this returns, on success and on error.
fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(content.as_bytes())?;
    writer.flush()
}
