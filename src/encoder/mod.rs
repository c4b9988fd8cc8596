//! Schema-driven Avro binary encoder
//!
//! `encode(schema, value) -> bytes` is a pure function of its inputs:
//! the same pair always yields the same bytes, and a failed call yields
//! none. The schema is only read, so it can be shared across threads
//! without locking.

mod binary;
mod record;
mod single_object;

pub use binary::{
    write_boolean, write_bytes, write_double, write_float, write_int, write_long, write_string,
    MAX_VARINT_LEN,
};
pub use record::{encode, RecordEncoder};
pub use single_object::{encode_single_object, header as single_object_header, SINGLE_OBJECT_MARKER};
