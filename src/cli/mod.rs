//! CLI module for avroenc
//!
//! Provides command-line interface for:
//! - encode: NDJSON records to an Avro container file or single-object frames
//! - fingerprint: CRC-64-AVRO fingerprint of a schema
//! - canonical: Parsing Canonical Form of a schema
//! - check: schema load and dry-run encode

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{canonical, check, encode, fingerprint, run, run_command, EncodeOptions};
pub use config::{Config, MismatchPolicy};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_records, write_error, write_error_to, write_response};
