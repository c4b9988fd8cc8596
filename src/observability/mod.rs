//! Observability subsystem for avroenc
//!
//! - Structured logging (JSON lines on stderr)
//! - Encoder counters
//! - Begin/complete scopes
//!
//! Observability is read-only: it never changes what gets encoded, and
//! a failing log write never fails an operation.
//!
//! ```ignore
//! use avroenc::observability::{Logger, Event, EncoderMetrics, ObservationScope};
//!
//! Logger::info("RECORD_ENCODED", &[("bytes", "19")]);
//!
//! let metrics = EncoderMetrics::new();
//! metrics.increment_records_encoded();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{EncoderMetrics, MetricsSnapshot};
pub use scope::ObservationScope;

/// Severity an event is logged at.
fn event_severity(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_rejection() {
        Severity::Warn
    } else if event == Event::RecordEncoded {
        Severity::Trace
    } else {
        Severity::Info
    }
}

/// Log one encoded record at trace level.
///
/// Per-record fields are only built when trace output is enabled.
pub fn log_record_encoded(bytes: usize) {
    let severity = event_severity(Event::RecordEncoded);
    if Logger::enabled(severity) {
        let bytes = bytes.to_string();
        Logger::log(severity, Event::RecordEncoded.as_str(), &[("bytes", &bytes)]);
    }
}

/// Log an event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_severity_mapping() {
        assert_eq!(event_severity(Event::SinkFailed), Severity::Fatal);
        assert_eq!(event_severity(Event::RecordRejected), Severity::Warn);
        assert_eq!(event_severity(Event::RecordEncoded), Severity::Trace);
        assert_eq!(event_severity(Event::BlockFlushed), Severity::Info);
    }

    #[test]
    fn test_log_event() {
        log_event_with_fields(Event::SchemaLoaded, &[("schema", "com.example.User")]);
        log_record_encoded(19);
    }
}
