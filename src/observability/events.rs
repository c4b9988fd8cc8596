//! Observable events for avroenc
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Schema file parsed
    SchemaLoaded,
    /// Schema registry directory loaded
    SchemasLoaded,
    /// Schema failed to load (FATAL)
    SchemaInvalid,

    // Encoding
    /// One record encoded
    RecordEncoded,
    /// Record rejected for not matching the schema
    RecordRejected,
    /// Input line could not be read as a value
    RecordUnreadable,

    // Container sink
    /// File header written
    HeaderWritten,
    /// Block flushed to the sink
    BlockFlushed,
    /// Container finished
    ContainerClosed,
    /// Sink write failed (FATAL)
    SinkFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaLoaded => "SCHEMA_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SchemaInvalid => "SCHEMA_INVALID",

            Event::RecordEncoded => "RECORD_ENCODED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::RecordUnreadable => "RECORD_UNREADABLE",

            Event::HeaderWritten => "CONTAINER_HEADER_WRITTEN",
            Event::BlockFlushed => "BLOCK_FLUSHED",
            Event::ContainerClosed => "CONTAINER_CLOSED",
            Event::SinkFailed => "SINK_FAILED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::SchemaInvalid | Event::SinkFailed)
    }

    /// Returns true if this event concerns a single record that was skipped
    pub fn is_rejection(&self) -> bool {
        matches!(self, Event::RecordRejected | Event::RecordUnreadable)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
