//! Schema subsystem for avroenc
//!
//! Schemas are parsed once from Avro JSON text and are read-only after
//! that. A loaded schema is always well formed:
//!
//! - Field names are unique within a record
//! - Every type tag and named reference resolves
//! - Nesting has no cycles
//! - No unions; every declared field is required

mod canonical;
mod errors;
mod loader;
mod parser;
mod types;

pub use canonical::{rabin_fingerprint, EMPTY_FINGERPRINT};
pub use errors::{MismatchDetails, SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use loader::{read_schema_file, SchemaRegistry};
pub use types::{EnumSchema, Field, FixedSchema, Name, RecordSchema, Schema};
