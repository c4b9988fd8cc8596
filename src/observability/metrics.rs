//! Encoder metrics
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters shared by the encode pipeline.
///
/// Relaxed ordering: counters are read after the work is done.
#[derive(Debug, Default)]
pub struct EncoderMetrics {
    /// Records encoded successfully
    records_encoded: AtomicU64,
    /// Records rejected with a schema mismatch or unreadable input
    records_rejected: AtomicU64,
    /// Bytes handed to the sink, headers included
    bytes_written: AtomicU64,
    /// Container blocks flushed
    blocks_flushed: AtomicU64,
}

impl EncoderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_records_encoded(&self) {
        self.records_encoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_records_rejected(&self) {
        self.records_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes_written(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn increment_blocks_flushed(&self) {
        self.blocks_flushed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn records_encoded(&self) -> u64 {
        self.records_encoded.load(Ordering::Relaxed)
    }

    pub fn records_rejected(&self) -> u64 {
        self.records_rejected.load(Ordering::Relaxed)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_encoded: self.records_encoded.load(Ordering::Relaxed),
            records_rejected: self.records_rejected.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            blocks_flushed: self.blocks_flushed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_encoded: u64,
    pub records_rejected: u64,
    pub bytes_written: u64,
    pub blocks_flushed: u64,
}
