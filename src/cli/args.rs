//! CLI argument definitions using clap
//!
//! Commands:
//! - avroenc encode --schema <file|name> --input <ndjson|-> --output <file>
//! - avroenc fingerprint --schema <file|name>
//! - avroenc canonical --schema <file|name>
//! - avroenc check --schema <file|name> [--input <ndjson|->]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// avroenc - A strict, deterministic, schema-driven Avro record encoder
#[derive(Parser, Debug)]
#[command(name = "avroenc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode NDJSON records into an Avro container file
    Encode {
        /// Schema file, or a full name from the configured schema_dir
        #[arg(long)]
        schema: String,

        /// NDJSON input, one record per line ("-" for stdin)
        #[arg(long, default_value = "-")]
        input: PathBuf,

        /// Output file
        #[arg(long)]
        output: PathBuf,

        /// Block codec (overrides config)
        #[arg(long, value_parser = ["null", "deflate"])]
        codec: Option<String>,

        /// What to do with a record that does not match the schema (overrides config)
        #[arg(long, value_parser = ["skip", "fail"])]
        on_mismatch: Option<String>,

        /// Write concatenated single-object frames instead of a container
        #[arg(long)]
        single_object: bool,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the CRC-64-AVRO fingerprint of a schema
    Fingerprint {
        #[arg(long)]
        schema: String,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the Parsing Canonical Form of a schema
    Canonical {
        #[arg(long)]
        schema: String,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load a schema and optionally check NDJSON records against it
    Check {
        #[arg(long)]
        schema: String,

        /// NDJSON input to encode without writing ("-" for stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
