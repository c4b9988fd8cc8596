//! Avro binary primitives
//!
//! - int/long: zig-zag, then base-128 varint, low groups first
//! - float/double: IEEE-754 little-endian
//! - bytes/string: long length, then the raw bytes

/// Maximum encoded size of a long.
pub const MAX_VARINT_LEN: usize = 10;

/// Writes a zig-zag varint long.
pub fn write_long(buf: &mut Vec<u8>, n: i64) {
    let mut z = ((n << 1) ^ (n >> 63)) as u64;
    while z >= 0x80 {
        buf.push((z as u8 & 0x7f) | 0x80);
        z >>= 7;
    }
    buf.push(z as u8);
}

/// Writes a zig-zag varint int. Same wire form as a long.
pub fn write_int(buf: &mut Vec<u8>, n: i32) {
    write_long(buf, n as i64);
}

pub fn write_boolean(buf: &mut Vec<u8>, b: bool) {
    buf.push(b as u8);
}

pub fn write_float(buf: &mut Vec<u8>, f: f32) {
    buf.extend_from_slice(&f.to_le_bytes());
}

pub fn write_double(buf: &mut Vec<u8>, d: f64) {
    buf.extend_from_slice(&d.to_le_bytes());
}

/// Writes a length-prefixed byte sequence.
pub fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_long(buf, bytes.len() as i64);
    buf.extend_from_slice(bytes);
}

/// Writes a length-prefixed UTF-8 string.
pub fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_bytes(buf, s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_bytes(n: i64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_long(&mut buf, n);
        buf
    }

    #[test]
    fn test_zigzag_vectors() {
        assert_eq!(long_bytes(0), [0x00]);
        assert_eq!(long_bytes(-1), [0x01]);
        assert_eq!(long_bytes(1), [0x02]);
        assert_eq!(long_bytes(-2), [0x03]);
        assert_eq!(long_bytes(2), [0x04]);
        assert_eq!(long_bytes(-64), [0x7f]);
        assert_eq!(long_bytes(64), [0x80, 0x01]);
        assert_eq!(long_bytes(8192), [0x80, 0x80, 0x01]);
    }

    #[test]
    fn test_extreme_longs() {
        assert_eq!(long_bytes(i64::MAX).len(), MAX_VARINT_LEN);
        assert_eq!(long_bytes(i64::MIN).len(), MAX_VARINT_LEN);
        assert_eq!(long_bytes(i64::MIN), [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]);
    }

    #[test]
    fn test_int_matches_long() {
        let mut a = Vec::new();
        write_int(&mut a, -300);
        assert_eq!(a, long_bytes(-300));
    }

    #[test]
    fn test_string_is_length_prefixed() {
        let mut buf = Vec::new();
        write_string(&mut buf, "foo");
        assert_eq!(buf, [0x06, b'f', b'o', b'o']);

        buf.clear();
        write_string(&mut buf, "");
        assert_eq!(buf, [0x00]);
    }

    #[test]
    fn test_floats_little_endian() {
        let mut buf = Vec::new();
        write_float(&mut buf, 1.0);
        assert_eq!(buf, [0x00, 0x00, 0x80, 0x3f]);

        buf.clear();
        write_double(&mut buf, 1.0);
        assert_eq!(buf, [0, 0, 0, 0, 0, 0, 0xf0, 0x3f]);
    }

    #[test]
    fn test_boolean() {
        let mut buf = Vec::new();
        write_boolean(&mut buf, true);
        write_boolean(&mut buf, false);
        assert_eq!(buf, [0x01, 0x00]);
    }
}
