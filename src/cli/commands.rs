//! CLI command implementations
//!
//! Each command loads its configuration first, then the schema, and
//! reports a single JSON object on stdout. Logs go to stderr.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value as Json};

use crate::container::{ContainerError, ContainerResult, ContainerWriter};
use crate::encoder::RecordEncoder;
use crate::observability::{
    log_event_with_fields, log_record_encoded, EncoderMetrics, Event, Logger, ObservationScope,
};
use crate::schema::{read_schema_file, Schema, SchemaRegistry};
use crate::value::Value;

use super::args::Command;
use super::config::{Config, MismatchPolicy};
use super::errors::{CliError, CliResult};
use super::io::{open_input, open_output, read_records, write_error_to, write_response};

/// Options of the `encode` command
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub schema: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub codec: Option<String>,
    pub on_mismatch: Option<String>,
    pub single_object: bool,
    pub config: Option<PathBuf>,
}

/// Main CLI entry point
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    report_failure(run_command(cli.command), &mut std::io::stdout())
}

/// Writes the error envelope for a failed command to `out`.
///
/// The command's own error is returned even when the envelope cannot be
/// written.
fn report_failure<W: Write>(result: CliResult<()>, out: &mut W) -> CliResult<()> {
    if let Err(e) = &result {
        let _ = write_error_to(out, e.code_str(), e.message());
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Encode {
            schema,
            input,
            output,
            codec,
            on_mismatch,
            single_object,
            config,
        } => encode(&EncodeOptions {
            schema,
            input,
            output,
            codec,
            on_mismatch,
            single_object,
            config,
        }),
        Command::Fingerprint { schema, config } => fingerprint(&schema, config.as_deref()),
        Command::Canonical { schema, config } => canonical(&schema, config.as_deref()),
        Command::Check {
            schema,
            input,
            config,
        } => check(&schema, input.as_deref(), config.as_deref()),
    }
}

/// Encode NDJSON records into a container file or single-object frames
pub fn encode(opts: &EncodeOptions) -> CliResult<()> {
    let mut config = Config::load_or_default(opts.config.as_deref())?;
    if let Some(codec) = &opts.codec {
        config.codec = codec
            .parse()
            .map_err(|e: ContainerError| CliError::config_error(e.to_string()))?;
    }
    if let Some(policy) = &opts.on_mismatch {
        config.on_mismatch = policy.parse()?;
    }
    apply_logging(&config);

    let schema = resolve_schema(&opts.schema, &config)?;
    let encoder = RecordEncoder::new(schema)?;
    let schema_name = encoder.record_schema().name.fullname();

    let reader = open_input(&opts.input)?;
    let mut out = open_output(&opts.output)?;
    let metrics = Arc::new(EncoderMetrics::new());

    let mode = if opts.single_object { "single-object" } else { "container" };
    let scope = ObservationScope::with_fields("ENCODE", &[("schema", schema_name.as_str()), ("mode", mode)]);

    let result = if opts.single_object {
        encode_frames(reader, &mut out, &encoder, config.on_mismatch, &metrics)
            .and_then(|()| out.flush().map_err(CliError::from))
    } else {
        encode_container(reader, out, encoder, &config, &metrics)
    };

    if let Err(e) = result {
        scope.fail(e.message());
        return Err(e);
    }

    let snapshot = metrics.snapshot();
    let written = snapshot.records_encoded.to_string();
    let rejected = snapshot.records_rejected.to_string();
    scope.complete_with_fields(&[("records", &written), ("rejected", &rejected)]);

    write_response(json!({
        "records_written": snapshot.records_encoded,
        "records_rejected": snapshot.records_rejected,
        "bytes_written": snapshot.bytes_written,
    }))
}

fn encode_container<R: BufRead, W: Write>(
    reader: R,
    out: W,
    encoder: RecordEncoder,
    config: &Config,
    metrics: &Arc<EncoderMetrics>,
) -> CliResult<()> {
    let mut writer = ContainerWriter::new(out, encoder, config.container_config())?
        .with_metrics(Arc::clone(metrics));

    pump(reader, config.on_mismatch, metrics, |value| {
        writer.append(value).map(|_| ())
    })?;

    writer.finish()?;
    Ok(())
}

fn encode_frames<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
    encoder: &RecordEncoder,
    policy: MismatchPolicy,
    metrics: &EncoderMetrics,
) -> CliResult<()> {
    pump(reader, policy, metrics, |value| {
        let frame = match encoder.encode_single_object(value) {
            Ok(frame) => frame,
            Err(e) => {
                metrics.increment_records_rejected();
                return Err(e.into());
            }
        };

        if let Err(e) = out.write_all(&frame) {
            let reason = e.to_string();
            log_event_with_fields(Event::SinkFailed, &[("reason", &reason)]);
            return Err(e.into());
        }

        metrics.increment_records_encoded();
        metrics.add_bytes_written(frame.len() as u64);
        log_record_encoded(frame.len());
        Ok(())
    })
}

/// Feeds every input record to `sink`, applying the mismatch policy.
///
/// Unreadable lines are counted here; the sink counts what it encodes
/// or rejects.
fn pump<R, F>(reader: R, policy: MismatchPolicy, metrics: &EncoderMetrics, mut sink: F) -> CliResult<()>
where
    R: BufRead,
    F: FnMut(&Value) -> ContainerResult<()>,
{
    for item in read_records(reader) {
        let (line, value) = item?;
        let line_str = line.to_string();

        let value = match value {
            Ok(value) => value,
            Err(e) => {
                metrics.increment_records_rejected();
                let reason = e.to_string();
                log_event_with_fields(Event::RecordUnreadable, &[("line", &line_str), ("reason", &reason)]);
                if policy == MismatchPolicy::Fail {
                    return Err(CliError::input_error(reason));
                }
                continue;
            }
        };

        match sink(&value) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                let reason = e.to_string();
                log_event_with_fields(Event::RecordRejected, &[("line", &line_str), ("reason", &reason)]);
                if policy == MismatchPolicy::Fail {
                    return Err(CliError::record_rejected(line, e));
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Print the CRC-64-AVRO fingerprint of a schema
pub fn fingerprint(schema: &str, config_path: Option<&Path>) -> CliResult<()> {
    let config = Config::load_or_default(config_path)?;
    apply_logging(&config);

    let schema = resolve_schema(schema, &config)?;
    write_response(fingerprint_report(&schema))
}

/// Fingerprint as a big-endian number and as the little-endian bytes of
/// a single-object header
pub fn fingerprint_report(schema: &Schema) -> Json {
    let fp = schema.fingerprint();
    json!({
        "fingerprint": format!("{:016x}", fp),
        "fingerprint_le": hex(&fp.to_le_bytes()),
    })
}

/// Print the Parsing Canonical Form of a schema
pub fn canonical(schema: &str, config_path: Option<&Path>) -> CliResult<()> {
    let config = Config::load_or_default(config_path)?;
    apply_logging(&config);

    let schema = resolve_schema(schema, &config)?;
    write_response(canonical_report(&schema))
}

pub fn canonical_report(schema: &Schema) -> Json {
    json!({
        "canonical": schema.canonical_form(),
    })
}

/// Load a schema and, with an input, encode every record without writing
pub fn check(schema: &str, input: Option<&Path>, config_path: Option<&Path>) -> CliResult<()> {
    let config = Config::load_or_default(config_path)?;
    apply_logging(&config);

    let schema = resolve_schema(schema, &config)?;
    let encoder = RecordEncoder::new(schema)?;

    let report = match input {
        Some(path) => check_report(&encoder, Some(open_input(path)?), config.on_mismatch)?,
        None => check_report(&encoder, None::<std::io::Empty>, config.on_mismatch)?,
    };
    write_response(report)
}

/// Builds the `check` report.
///
/// Rejected and unreadable records are listed with their line numbers.
/// With `MismatchPolicy::Fail` the first rejection is returned as an
/// error instead.
pub fn check_report<R: BufRead>(
    encoder: &RecordEncoder,
    input: Option<R>,
    policy: MismatchPolicy,
) -> CliResult<Json> {
    let mut report = json!({
        "schema": encoder.record_schema().name.fullname(),
        "fingerprint": format!("{:016x}", encoder.fingerprint()),
    });

    let Some(reader) = input else {
        return Ok(report);
    };

    let mut valid = 0u64;
    let mut rejections = Vec::new();

    for item in read_records(reader) {
        let (line, value) = item?;
        let outcome = value
            .map_err(|e| e.to_string())
            .and_then(|v| encoder.encode(&v).map(|_| ()).map_err(|e| e.to_string()));

        match outcome {
            Ok(()) => valid += 1,
            Err(reason) => {
                if policy == MismatchPolicy::Fail {
                    return Err(CliError::record_rejected(line, reason));
                }
                rejections.push(json!({"line": line, "reason": reason}));
            }
        }
    }

    report["records_valid"] = json!(valid);
    report["records_rejected"] = json!(rejections.len());
    report["rejections"] = json!(rejections);
    Ok(report)
}

fn apply_logging(config: &Config) {
    Logger::set_min_severity(config.log_level);

    let codec = config.codec.as_str();
    let block_size = config.block_size.to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("codec", codec), ("block_size", &block_size)]);
}

/// Resolves `--schema`: a path to a schema file, or the full name of a
/// type in the configured schema directory.
fn resolve_schema(reference: &str, config: &Config) -> CliResult<Arc<Schema>> {
    let path = Path::new(reference);
    if path.is_file() {
        return match read_schema_file(path) {
            Ok(schema) => {
                log_event_with_fields(Event::SchemaLoaded, &[("path", reference)]);
                Ok(Arc::new(schema))
            }
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(Event::SchemaInvalid, &[("path", reference), ("reason", &reason)]);
                Err(e.into())
            }
        };
    }

    if let Some(dir) = &config.schema_dir {
        let mut registry = SchemaRegistry::new(dir);
        registry.load_all()?;
        if let Some(schema) = registry.get(reference) {
            return Ok(schema);
        }
    }

    Err(CliError::invalid_schema(format!("Schema not found: '{}'", reference)))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
