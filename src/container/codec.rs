//! Block compression codecs
//!
//! - null: blocks are stored as is
//! - deflate: raw DEFLATE (RFC 1951), no zlib header or checksum

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use super::errors::{ContainerError, ContainerResult};

/// Default DEFLATE compression level.
pub const DEFAULT_DEFLATE_LEVEL: u32 = 6;

/// Compression codec for container blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    Null,
    Deflate,
}

impl Codec {
    /// Name stored under `avro.codec` in the file header
    pub fn as_str(&self) -> &'static str {
        match self {
            Codec::Null => "null",
            Codec::Deflate => "deflate",
        }
    }

    /// Compresses one block payload.
    pub fn compress(&self, data: &[u8], level: u32) -> ContainerResult<Vec<u8>> {
        match self {
            Codec::Null => Ok(data.to_vec()),
            Codec::Deflate => {
                let mut encoder = DeflateEncoder::new(Vec::with_capacity(data.len() / 2), Compression::new(level));
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Codec {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(Codec::Null),
            "deflate" => Ok(Codec::Deflate),
            other => Err(ContainerError::UnknownCodec(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::DeflateDecoder;
    use std::io::Read;

    #[test]
    fn test_null_codec_is_identity() {
        let data = b"abcabcabc";
        assert_eq!(Codec::Null.compress(data, DEFAULT_DEFLATE_LEVEL).unwrap(), data);
    }

    #[test]
    fn test_deflate_inflates_back() {
        let data: Vec<u8> = b"user1admindomain1".iter().cycle().take(4096).copied().collect();
        let compressed = Codec::Deflate.compress(&data, DEFAULT_DEFLATE_LEVEL).unwrap();
        assert!(compressed.len() < data.len());

        let mut inflated = Vec::new();
        DeflateDecoder::new(&compressed[..]).read_to_end(&mut inflated).unwrap();
        assert_eq!(inflated, data);
    }

    #[test]
    fn test_parse_codec_names() {
        assert_eq!("null".parse::<Codec>().unwrap(), Codec::Null);
        assert_eq!("deflate".parse::<Codec>().unwrap(), Codec::Deflate);
        assert!(matches!("snappy".parse::<Codec>(), Err(ContainerError::UnknownCodec(_))));
    }

    #[test]
    fn test_serde_lowercase() {
        let codec: Codec = serde_json::from_str("\"deflate\"").unwrap();
        assert_eq!(codec, Codec::Deflate);
        assert_eq!(serde_json::to_string(&Codec::Null).unwrap(), "\"null\"");
    }
}
