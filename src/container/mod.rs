//! Avro object container file sink
//!
//! Wraps any `std::io::Write` and stores encoded records in blocks with
//! the writer schema embedded in the header, so readers need no
//! out-of-band schema.

mod codec;
mod errors;
mod writer;

pub use codec::{Codec, DEFAULT_DEFLATE_LEVEL};
pub use errors::{ContainerError, ContainerResult};
pub use writer::{ContainerConfig, ContainerWriter, DEFAULT_BLOCK_SIZE, MAGIC, SYNC_MARKER_LEN};
