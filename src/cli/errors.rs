//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::fmt;
use std::io;

use crate::container::ContainerError;
use crate::schema::SchemaError;
use crate::value::ValueSourceError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (input, output, stdout)
    IoError,
    /// Schema could not be loaded
    InvalidSchema,
    /// A record was rejected and the policy is to fail
    RecordRejected,
    /// Input line is not a readable value
    InputError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "AVRO_CLI_CONFIG_ERROR",
            Self::IoError => "AVRO_CLI_IO_ERROR",
            Self::InvalidSchema => "AVRO_CLI_INVALID_SCHEMA",
            Self::RecordRejected => "AVRO_CLI_RECORD_REJECTED",
            Self::InputError => "AVRO_CLI_INPUT_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidSchema, msg)
    }

    /// Record rejected at `line`
    pub fn record_rejected(line: usize, msg: impl fmt::Display) -> Self {
        Self::new(CliErrorCode::RecordRejected, format!("line {}: {}", line, msg))
    }

    pub fn input_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InputError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        if e.is_mismatch() {
            Self::new(CliErrorCode::RecordRejected, e.to_string())
        } else {
            Self::invalid_schema(e.to_string())
        }
    }
}

impl From<ContainerError> for CliError {
    fn from(e: ContainerError) -> Self {
        match e {
            ContainerError::Encode(schema_err) => schema_err.into(),
            ContainerError::Io(io_err) => io_err.into(),
            other => Self::config_error(other.to_string()),
        }
    }
}

impl From<ValueSourceError> for CliError {
    fn from(e: ValueSourceError) -> Self {
        Self::input_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
