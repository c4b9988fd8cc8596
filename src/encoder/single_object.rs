//! Single-object encoding
//!
//! Frame layout:
//! - 2-byte marker `C3 01`
//! - 8-byte little-endian CRC-64-AVRO fingerprint of the writer schema
//! - Avro binary body

use crate::schema::{Schema, SchemaResult};
use crate::value::Value;

use super::record::encode;

/// Marker opening every single-object frame.
pub const SINGLE_OBJECT_MARKER: [u8; 2] = [0xC3, 0x01];

/// Size of the frame header (marker + fingerprint).
pub const HEADER_LEN: usize = 10;

/// Builds the frame header for a schema fingerprint.
pub fn header(fingerprint: u64) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[..2].copy_from_slice(&SINGLE_OBJECT_MARKER);
    header[2..].copy_from_slice(&fingerprint.to_le_bytes());
    header
}

/// Encodes `value` as a single-object frame.
///
/// Computes the schema fingerprint on every call; use
/// `RecordEncoder::encode_single_object` when encoding many values.
pub fn encode_single_object(schema: &Schema, value: &Value) -> SchemaResult<Vec<u8>> {
    let body = encode(schema, value)?;
    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.extend_from_slice(&header(schema.fingerprint()));
    frame.extend_from_slice(&body);
    Ok(frame)
}
