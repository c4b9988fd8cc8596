//! Object container file writer
//!
//! File layout:
//! - magic `Obj\x01`
//! - metadata map<bytes>: `avro.codec`, `avro.schema`
//! - 16-byte sync marker
//! - blocks: record count (long), payload size (long), payload, sync marker
//!
//! The header is written on the first flush. A block is flushed once its
//! encoded size reaches `block_size`, and on `finish`.

use std::io::Write;
use std::sync::Arc;

use crate::encoder::{write_bytes, write_long, write_string, RecordEncoder};
use crate::observability::{log_event_with_fields, log_record_encoded, EncoderMetrics, Event};
use crate::value::Value;

use super::codec::{Codec, DEFAULT_DEFLATE_LEVEL};
use super::errors::{ContainerError, ContainerResult};

/// Magic bytes opening every container file.
pub const MAGIC: [u8; 4] = [b'O', b'b', b'j', 1];

/// Length of the sync marker.
pub const SYNC_MARKER_LEN: usize = 16;

/// Default uncompressed block size in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 64_000;

/// Container writer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerConfig {
    pub codec: Codec,
    /// Flush threshold for the uncompressed block, in bytes
    pub block_size: usize,
    /// DEFLATE level 0-9, ignored by the null codec
    pub deflate_level: u32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            codec: Codec::Null,
            block_size: DEFAULT_BLOCK_SIZE,
            deflate_level: DEFAULT_DEFLATE_LEVEL,
        }
    }
}

impl ContainerConfig {
    pub fn with_codec(codec: Codec) -> Self {
        Self {
            codec,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ContainerResult<()> {
        if self.block_size == 0 {
            return Err(ContainerError::InvalidConfig("block_size must be > 0".into()));
        }
        if self.deflate_level > 9 {
            return Err(ContainerError::InvalidConfig(format!(
                "deflate_level must be 0-9, got {}",
                self.deflate_level
            )));
        }
        Ok(())
    }
}

/// Writes encoded records into an Avro object container.
pub struct ContainerWriter<W: Write> {
    writer: W,
    encoder: RecordEncoder,
    config: ContainerConfig,
    sync_marker: [u8; SYNC_MARKER_LEN],
    /// Encoded records of the open block
    block: Vec<u8>,
    block_records: u64,
    header_written: bool,
    records_written: u64,
    bytes_written: u64,
    metrics: Option<Arc<EncoderMetrics>>,
}

impl<W: Write> ContainerWriter<W> {
    /// Creates a writer with a random sync marker.
    pub fn new(writer: W, encoder: RecordEncoder, config: ContainerConfig) -> ContainerResult<Self> {
        config.validate()?;

        Ok(Self {
            writer,
            encoder,
            config,
            sync_marker: rand::random(),
            block: Vec::with_capacity(config.block_size.min(DEFAULT_BLOCK_SIZE)),
            block_records: 0,
            header_written: false,
            records_written: 0,
            bytes_written: 0,
            metrics: None,
        })
    }

    /// Replaces the sync marker. Only valid before anything is written.
    pub fn with_sync_marker(mut self, marker: [u8; SYNC_MARKER_LEN]) -> Self {
        debug_assert!(!self.header_written, "sync marker changed after header");
        self.sync_marker = marker;
        self
    }

    /// Reports writes to the given metrics.
    pub fn with_metrics(mut self, metrics: Arc<EncoderMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn sync_marker(&self) -> &[u8; SYNC_MARKER_LEN] {
        &self.sync_marker
    }

    pub fn encoder(&self) -> &RecordEncoder {
        &self.encoder
    }

    /// Records accepted so far, flushed or not.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Bytes handed to the inner writer so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Encodes and buffers one record, flushing the block when full.
    ///
    /// A schema mismatch rejects the record and leaves the open block
    /// untouched; the writer remains usable.
    pub fn append(&mut self, value: &Value) -> ContainerResult<usize> {
        let written = match self.encoder.encode_into(value, &mut self.block) {
            Ok(n) => n,
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.increment_records_rejected();
                }
                return Err(e.into());
            }
        };

        self.block_records += 1;
        self.records_written += 1;
        if let Some(metrics) = &self.metrics {
            metrics.increment_records_encoded();
        }
        log_record_encoded(written);

        if self.block.len() >= self.config.block_size {
            self.flush()?;
        }

        Ok(written)
    }

    /// Writes the open block, if any, to the inner writer.
    pub fn flush(&mut self) -> ContainerResult<()> {
        self.write_header()?;

        if self.block_records == 0 {
            return Ok(());
        }

        let payload = self.config.codec.compress(&self.block, self.config.deflate_level)?;

        let mut frame = Vec::with_capacity(payload.len() + 2 * 10 + SYNC_MARKER_LEN);
        write_long(&mut frame, self.block_records as i64);
        write_long(&mut frame, payload.len() as i64);
        frame.extend_from_slice(&payload);
        frame.extend_from_slice(&self.sync_marker);

        self.write_raw(&frame)?;

        let records = self.block_records.to_string();
        let bytes = frame.len().to_string();
        log_event_with_fields(Event::BlockFlushed, &[("records", &records), ("bytes", &bytes)]);
        if let Some(metrics) = &self.metrics {
            metrics.increment_blocks_flushed();
        }

        self.block.clear();
        self.block_records = 0;
        Ok(())
    }

    /// Flushes the last block and returns the inner writer.
    ///
    /// A container with no records still gets a complete header.
    pub fn finish(mut self) -> ContainerResult<W> {
        self.flush()?;
        self.writer.flush()?;

        let records = self.records_written.to_string();
        let bytes = self.bytes_written.to_string();
        log_event_with_fields(Event::ContainerClosed, &[("records", &records), ("bytes", &bytes)]);

        Ok(self.writer)
    }

    fn write_header(&mut self) -> ContainerResult<()> {
        if self.header_written {
            return Ok(());
        }

        let schema_json = serde_json::to_vec(&self.encoder.schema().to_json())
            .map_err(|e| ContainerError::InvalidConfig(format!("schema serialization: {}", e)))?;

        let mut header = Vec::with_capacity(schema_json.len() + 64);
        header.extend_from_slice(&MAGIC);

        // Metadata map: one block of two entries, keys sorted
        write_long(&mut header, 2);
        write_string(&mut header, "avro.codec");
        write_bytes(&mut header, self.config.codec.as_str().as_bytes());
        write_string(&mut header, "avro.schema");
        write_bytes(&mut header, &schema_json);
        write_long(&mut header, 0);

        header.extend_from_slice(&self.sync_marker);

        self.write_raw(&header)?;
        self.header_written = true;

        let codec = self.config.codec.as_str();
        log_event_with_fields(Event::HeaderWritten, &[("codec", codec)]);
        Ok(())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> ContainerResult<()> {
        if let Err(e) = self.writer.write_all(bytes) {
            let reason = e.to_string();
            log_event_with_fields(Event::SinkFailed, &[("reason", &reason)]);
            return Err(e.into());
        }

        self.bytes_written += bytes.len() as u64;
        if let Some(metrics) = &self.metrics {
            metrics.add_bytes_written(bytes.len() as u64);
        }
        Ok(())
    }
}
