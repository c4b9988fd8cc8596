//! I/O handling for CLI
//!
//! - Input: NDJSON, one record per line, from a file or stdin
//! - Output: a single JSON object on stdout per command
//! - UTF-8 only

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::Value as Json;

use crate::value::{from_json_line, Value, ValueSourceError};

use super::errors::{CliError, CliResult};

/// One NDJSON input line: its 1-based number and the value read from it
pub type InputRecord = (usize, Result<Value, ValueSourceError>);

/// Opens a file for reading, or stdin for "-"
pub fn open_input(path: &Path) -> CliResult<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file = File::open(path).map_err(|e| {
        CliError::io_error(format!("Failed to open input {}: {}", path.display(), e))
    })?;
    Ok(Box::new(BufReader::new(file)))
}

/// Creates the output file. An existing file is replaced.
pub fn open_output(path: &Path) -> CliResult<BufWriter<File>> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| {
            CliError::io_error(format!("Failed to create output {}: {}", path.display(), e))
        })?;
    Ok(BufWriter::new(file))
}

/// Reads NDJSON records, skipping blank lines.
///
/// A line that is not a readable value is yielded as an error so the
/// caller can apply its mismatch policy; a failing reader ends the input
/// with an I/O error.
pub fn read_records<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<InputRecord>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line_no = idx + 1;
            match line {
                Ok(text) if text.trim().is_empty() => None,
                Ok(text) => Some(Ok((line_no, from_json_line(&text, line_no)))),
                Err(e) => Some(Err(CliError::io_error(format!(
                    "Failed to read line {}: {}",
                    line_no, e
                )))),
            }
        })
}

/// Write a success response to stdout
pub fn write_response(data: Json) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_error_to(&mut io::stdout(), code, message)
}

/// Write an error response to `writer`
pub fn write_error_to<W: Write>(writer: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}
