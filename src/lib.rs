//! avroenc - A strict, deterministic, schema-driven Avro record encoder
//!
//! - `schema`: schema parsing, canonical form, fingerprints, registry
//! - `value`: the value tree records are built from
//! - `encoder`: Avro binary encoding and single-object framing
//! - `container`: object container file writer
//! - `observability`: structured logs and counters
//! - `cli`: the `avroenc` command line

pub mod cli;
pub mod container;
pub mod encoder;
pub mod observability;
pub mod schema;
pub mod value;
