//! Schema error types
//!
//! Error codes:
//! - AVRO_INVALID_SCHEMA (FATAL to the schema instance)
//! - AVRO_SCHEMA_MISMATCH (REJECT, per record)
//! - AVRO_SCHEMA_IMMUTABLE (FATAL, registry only)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The offending record is rejected; the caller may continue
    Reject,
    /// The schema cannot be used at all
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Schema text is malformed (duplicate field, unknown type, cycle, ...)
    AvroInvalidSchema,
    /// Value does not conform to the schema
    AvroSchemaMismatch,
    /// Attempt to redefine a registered schema
    AvroSchemaImmutable,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::AvroInvalidSchema => "AVRO_INVALID_SCHEMA",
            SchemaErrorCode::AvroSchemaMismatch => "AVRO_SCHEMA_MISMATCH",
            SchemaErrorCode::AvroSchemaImmutable => "AVRO_SCHEMA_IMMUTABLE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::AvroSchemaMismatch => Severity::Reject,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Mismatch details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchDetails {
    /// Field path (e.g., "identity.role", "tags[2]")
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value kind found
    pub actual: String,
}

impl MismatchDetails {
    pub fn new(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "field to be present", "missing")
    }

    pub fn extra_field(field: impl Into<String>) -> Self {
        Self::new(field, "no undeclared fields", "extra field present")
    }

    pub fn type_mismatch(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(field, expected, actual)
    }
}

impl fmt::Display for MismatchDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = if self.field.is_empty() { "$root" } else { &self.field };
        write!(f, "field '{}': expected {}, got {}", field, self.expected, self.actual)
    }
}

/// Schema error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Full name of the schema involved, if known
    schema_name: Option<String>,
    details: Option<MismatchDetails>,
}

impl SchemaError {
    /// Create an invalid schema error
    pub fn invalid_schema(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::AvroInvalidSchema,
            message: format!("Invalid schema: {}", reason.into()),
            schema_name: None,
            details: None,
        }
    }

    /// Create an error for a malformed schema file
    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::AvroInvalidSchema,
            message: format!("Malformed schema file '{}': {}", path.into(), reason.into()),
            schema_name: None,
            details: None,
        }
    }

    /// Create a schema mismatch error
    pub fn mismatch(schema_name: impl Into<String>, details: MismatchDetails) -> Self {
        Self {
            code: SchemaErrorCode::AvroSchemaMismatch,
            message: format!("Value does not match schema: {}", details),
            schema_name: Some(schema_name.into()),
            details: Some(details),
        }
    }

    /// Create a schema immutable error
    pub fn schema_immutable(schema_name: impl Into<String>) -> Self {
        let name = schema_name.into();
        Self {
            code: SchemaErrorCode::AvroSchemaImmutable,
            message: format!("Schema '{}' is already registered", name),
            schema_name: Some(name),
            details: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the schema full name if applicable
    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    /// Returns mismatch details if applicable
    pub fn details(&self) -> Option<&MismatchDetails> {
        self.details.as_ref()
    }

    pub fn is_invalid_schema(&self) -> bool {
        self.code == SchemaErrorCode::AvroInvalidSchema
    }

    pub fn is_mismatch(&self) -> bool {
        self.code == SchemaErrorCode::AvroSchemaMismatch
    }

    /// Returns whether this error invalidates the schema itself
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
