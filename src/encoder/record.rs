//! Schema-driven record encoding
//!
//! Encoding semantics:
//! - Fields are written in schema declaration order, never value order
//! - Nested records are written inline with no framing
//! - A missing field, an undeclared field or a type mismatch at any depth
//!   fails the whole call with AVRO_SCHEMA_MISMATCH
//! - Failure leaves no partial output
//!
//! Accepted value kinds per schema type follow Avro promotion rules:
//! int -> long -> float -> double, string <-> bytes.

use std::fmt;
use std::sync::Arc;

use crate::schema::{MismatchDetails, RecordSchema, Schema, SchemaError, SchemaResult};
use crate::value::{Record, Value};

use super::binary::{
    write_boolean, write_bytes, write_double, write_float, write_int, write_long, write_string,
};
use super::single_object;

/// Encodes `value` against `schema` into a fresh buffer.
pub fn encode(schema: &Schema, value: &Value) -> SchemaResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(64);
    encode_value(schema, value, &mut buf, &FieldPath::Root)
        .map_err(|details| SchemaError::mismatch(schema_label(schema), details))?;
    Ok(buf)
}

/// Reusable encoder bound to one record schema.
///
/// Clones share the schema. The encoder holds no mutable state, so one
/// instance can serve any number of threads.
#[derive(Debug, Clone)]
pub struct RecordEncoder {
    schema: Arc<Schema>,
    fingerprint: u64,
}

impl RecordEncoder {
    /// Creates an encoder for a record schema.
    pub fn new(schema: Arc<Schema>) -> SchemaResult<Self> {
        if schema.as_record().is_none() {
            return Err(SchemaError::invalid_schema(format!(
                "top-level schema must be a record, got '{}'",
                schema.type_name()
            )));
        }

        let fingerprint = schema.fingerprint();
        Ok(Self { schema, fingerprint })
    }

    /// Parses schema text and creates an encoder for it.
    pub fn from_schema_str(text: &str) -> SchemaResult<Self> {
        Self::new(Arc::new(Schema::parse_str(text)?))
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the top-level record schema.
    pub fn record_schema(&self) -> &RecordSchema {
        match self.schema.as_ref() {
            Schema::Record(record) => record,
            // checked in new()
            _ => unreachable!("RecordEncoder holds a non-record schema"),
        }
    }

    /// CRC-64-AVRO fingerprint of the schema's canonical form.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Encodes one value.
    pub fn encode(&self, value: &Value) -> SchemaResult<Vec<u8>> {
        encode(&self.schema, value)
    }

    /// Appends the encoding of `value` to `buf` and returns the number of
    /// bytes written. On failure `buf` is left as it was.
    pub fn encode_into(&self, value: &Value, buf: &mut Vec<u8>) -> SchemaResult<usize> {
        let start = buf.len();
        match encode_value(&self.schema, value, buf, &FieldPath::Root) {
            Ok(()) => Ok(buf.len() - start),
            Err(details) => {
                buf.truncate(start);
                Err(SchemaError::mismatch(schema_label(&self.schema), details))
            }
        }
    }

    /// Encodes one value as a single-object frame.
    pub fn encode_single_object(&self, value: &Value) -> SchemaResult<Vec<u8>> {
        let mut buf = single_object::header(self.fingerprint).to_vec();
        self.encode_into(value, &mut buf)?;
        Ok(buf)
    }
}

/// Location of a value inside the tree, rendered only on failure.
enum FieldPath<'a> {
    Root,
    Field(&'a FieldPath<'a>, &'a str),
    Index(&'a FieldPath<'a>, usize),
    Key(&'a FieldPath<'a>, &'a str),
}

impl fmt::Display for FieldPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Root => Ok(()),
            FieldPath::Field(FieldPath::Root, name) => write!(f, "{}", name),
            FieldPath::Field(parent, name) => write!(f, "{}.{}", parent, name),
            FieldPath::Index(parent, i) => write!(f, "{}[{}]", parent, i),
            FieldPath::Key(parent, key) => write!(f, "{}[\"{}\"]", parent, key),
        }
    }
}

fn schema_label(schema: &Schema) -> String {
    schema
        .name()
        .map(|n| n.fullname())
        .unwrap_or_else(|| schema.type_name().to_string())
}

fn mismatch(path: &FieldPath<'_>, schema: &Schema, value: &Value) -> MismatchDetails {
    MismatchDetails::type_mismatch(path.to_string(), schema.describe(), value.kind())
}

fn encode_value(
    schema: &Schema,
    value: &Value,
    buf: &mut Vec<u8>,
    path: &FieldPath<'_>,
) -> Result<(), MismatchDetails> {
    match (schema, value) {
        (Schema::Null, Value::Null) => {}
        (Schema::Boolean, Value::Boolean(b)) => write_boolean(buf, *b),
        (Schema::Int, Value::Int(n)) => write_int(buf, *n),
        (Schema::Long, Value::Int(n)) => write_long(buf, *n as i64),
        (Schema::Long, Value::Long(n)) => write_long(buf, *n),
        (Schema::Float, Value::Int(n)) => write_float(buf, *n as f32),
        (Schema::Float, Value::Long(n)) => write_float(buf, *n as f32),
        (Schema::Float, Value::Float(x)) => write_float(buf, *x),
        (Schema::Double, Value::Int(n)) => write_double(buf, *n as f64),
        (Schema::Double, Value::Long(n)) => write_double(buf, *n as f64),
        (Schema::Double, Value::Float(x)) => write_double(buf, *x as f64),
        (Schema::Double, Value::Double(x)) => write_double(buf, *x),
        (Schema::Bytes, Value::Bytes(b)) => write_bytes(buf, b),
        (Schema::Bytes, Value::String(s)) => write_bytes(buf, s.as_bytes()),
        (Schema::String, Value::String(s)) => write_string(buf, s),
        (Schema::String, Value::Bytes(b)) => {
            let s = std::str::from_utf8(b).map_err(|_| {
                MismatchDetails::type_mismatch(path.to_string(), "string (valid UTF-8)", "bytes")
            })?;
            write_string(buf, s);
        }
        (Schema::Fixed(fixed), Value::Fixed(b) | Value::Bytes(b)) => {
            write_fixed(buf, fixed.size, b, path)?;
        }
        (Schema::Fixed(fixed), Value::String(s)) => {
            write_fixed(buf, fixed.size, s.as_bytes(), path)?;
        }
        (Schema::Enum(e), Value::Enum(symbol) | Value::String(symbol)) => {
            let index = e.index_of(symbol).ok_or_else(|| {
                MismatchDetails::type_mismatch(
                    path.to_string(),
                    format!("one of {:?}", e.symbols()),
                    format!("symbol '{}'", symbol),
                )
            })?;
            write_int(buf, index as i32);
        }
        (Schema::Array(items), Value::Array(values)) => {
            if !values.is_empty() {
                write_long(buf, values.len() as i64);
                for (i, item) in values.iter().enumerate() {
                    encode_value(items, item, buf, &FieldPath::Index(path, i))?;
                }
            }
            write_long(buf, 0);
        }
        (Schema::Map(values_schema), Value::Map(entries)) => {
            if !entries.is_empty() {
                write_long(buf, entries.len() as i64);
                for (key, item) in entries {
                    write_string(buf, key);
                    encode_value(values_schema, item, buf, &FieldPath::Key(path, key))?;
                }
            }
            write_long(buf, 0);
        }
        // JSON objects arrive as records; a map schema reads them by field name
        (Schema::Map(values_schema), Value::Record(record)) => {
            if !record.is_empty() {
                write_long(buf, record.len() as i64);
                for (key, item) in record.iter() {
                    write_string(buf, key);
                    encode_value(values_schema, item, buf, &FieldPath::Key(path, key))?;
                }
            }
            write_long(buf, 0);
        }
        (Schema::Record(record_schema), Value::Record(record)) => {
            encode_record(record_schema, record, buf, path)?;
        }
        (schema, value) => return Err(mismatch(path, schema, value)),
    }
    Ok(())
}

fn encode_record(
    schema: &RecordSchema,
    record: &Record,
    buf: &mut Vec<u8>,
    path: &FieldPath<'_>,
) -> Result<(), MismatchDetails> {
    // No undeclared fields
    if let Some(extra) = record.names().find(|name| schema.field(name).is_none()) {
        return Err(MismatchDetails::extra_field(FieldPath::Field(path, extra).to_string()));
    }

    for field in schema.fields() {
        let field_path = FieldPath::Field(path, &field.name);
        let value = record
            .get(&field.name)
            .ok_or_else(|| MismatchDetails::missing_field(field_path.to_string()))?;
        encode_value(&field.schema, value, buf, &field_path)?;
    }

    Ok(())
}

fn write_fixed(buf: &mut Vec<u8>, size: usize, bytes: &[u8], path: &FieldPath<'_>) -> Result<(), MismatchDetails> {
    if bytes.len() != size {
        return Err(MismatchDetails::type_mismatch(
            path.to_string(),
            format!("{} bytes", size),
            format!("{} bytes", bytes.len()),
        ));
    }
    buf.extend_from_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn user_encoder() -> RecordEncoder {
        RecordEncoder::from_schema_str(
            r#"{
                "type": "record",
                "name": "User",
                "fields": [
                    {"name": "username", "type": "string"},
                    {"name": "identity", "type": {
                        "type": "record",
                        "name": "Identity",
                        "fields": [
                            {"name": "role", "type": "string"},
                            {"name": "domain", "type": "string"}
                        ]
                    }}
                ]
            }"#,
        )
        .unwrap()
    }

    fn user_value() -> Value {
        Record::new()
            .with("username", "user1")
            .with("identity", Record::new().with("role", "admin").with("domain", "domain1"))
            .into()
    }

    fn details(err: &SchemaError) -> &MismatchDetails {
        assert!(err.is_mismatch(), "unexpected error: {}", err);
        err.details().unwrap()
    }

    #[test]
    fn test_sample_record_exact_bytes() {
        let bytes = user_encoder().encode(&user_value()).unwrap();

        let mut expected = vec![0x0a];
        expected.extend_from_slice(b"user1");
        expected.push(0x0a);
        expected.extend_from_slice(b"admin");
        expected.push(0x0e);
        expected.extend_from_slice(b"domain1");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_missing_nested_record_fails() {
        let value: Value = Record::new().with("username", "user1").into();
        let err = user_encoder().encode(&value).unwrap_err();
        let d = details(&err);
        assert_eq!(d.field, "identity");
        assert_eq!(d.actual, "missing");
        assert_eq!(err.schema_name(), Some("User"));
    }

    #[test]
    fn test_missing_nested_field_path() {
        let value: Value = Record::new()
            .with("username", "user1")
            .with("identity", Record::new().with("role", "admin"))
            .into();
        let err = user_encoder().encode(&value).unwrap_err();
        assert_eq!(details(&err).field, "identity.domain");
    }

    #[test]
    fn test_extra_field_fails() {
        let value: Value = Record::new()
            .with("username", "user1")
            .with("identity", Record::new().with("role", "admin").with("domain", "d"))
            .with("email", "x@example.com")
            .into();
        let err = user_encoder().encode(&value).unwrap_err();
        let d = details(&err);
        assert_eq!(d.field, "email");
        assert_eq!(d.actual, "extra field present");
    }

    #[test]
    fn test_type_mismatch_nested() {
        let value: Value = Record::new()
            .with("username", "user1")
            .with("identity", Record::new().with("role", 7).with("domain", "d"))
            .into();
        let err = user_encoder().encode(&value).unwrap_err();
        let d = details(&err);
        assert_eq!(d.field, "identity.role");
        assert_eq!(d.expected, "string");
        assert_eq!(d.actual, "int");
    }

    #[test]
    fn test_root_must_be_record() {
        let err = user_encoder().encode(&Value::from("user1")).unwrap_err();
        let d = details(&err);
        assert_eq!(d.field, "");
        assert_eq!(d.expected, "record 'User'");
    }

    #[test]
    fn test_encode_into_leaves_buffer_on_failure() {
        let encoder = user_encoder();
        let mut buf = vec![0xAA, 0xBB];

        let bad: Value = Record::new()
            .with("username", "user1")
            .with("identity", Record::new().with("role", "admin").with("domain", 1))
            .into();
        assert!(encoder.encode_into(&bad, &mut buf).is_err());
        assert_eq!(buf, [0xAA, 0xBB]);

        let written = encoder.encode_into(&user_value(), &mut buf).unwrap();
        assert_eq!(written, buf.len() - 2);
    }

    #[test]
    fn test_non_record_top_level_rejected() {
        let err = RecordEncoder::new(Arc::new(Schema::String)).unwrap_err();
        assert!(err.is_invalid_schema());
    }

    #[test]
    fn test_numeric_promotions() {
        let schema = Schema::parse_str(
            r#"{"type": "record", "name": "N", "fields": [
                {"name": "l", "type": "long"},
                {"name": "f", "type": "float"},
                {"name": "d", "type": "double"}
            ]}"#,
        )
        .unwrap();

        let value: Value = Record::new().with("l", 1).with("f", 2).with("d", 3i64).into();
        let bytes = encode(&schema, &value).unwrap();

        let mut expected = vec![0x02];
        expected.extend_from_slice(&2.0f32.to_le_bytes());
        expected.extend_from_slice(&3.0f64.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_no_narrowing() {
        let value: Value = Record::new().with("i", 1i64).into();
        let schema = Schema::parse_str(
            r#"{"type": "record", "name": "N", "fields": [{"name": "i", "type": "int"}]}"#,
        )
        .unwrap();
        let err = encode(&schema, &value).unwrap_err();
        assert_eq!(details(&err).actual, "long");

        let err = encode(&Schema::Long, &Value::Double(1.0)).unwrap_err();
        assert_eq!(details(&err).expected, "long");
    }

    #[test]
    fn test_null_only_for_null_schema() {
        assert_eq!(encode(&Schema::Null, &Value::Null).unwrap(), Vec::<u8>::new());
        let err = encode(&Schema::String, &Value::Null).unwrap_err();
        assert_eq!(details(&err).actual, "null");
    }

    #[test]
    fn test_bytes_and_string_interchange() {
        assert_eq!(encode(&Schema::Bytes, &Value::from("ab")).unwrap(), [0x04, b'a', b'b']);
        assert_eq!(
            encode(&Schema::String, &Value::Bytes(b"ab".to_vec())).unwrap(),
            [0x04, b'a', b'b']
        );
        let err = encode(&Schema::String, &Value::Bytes(vec![0xff, 0xfe])).unwrap_err();
        assert!(details(&err).expected.contains("UTF-8"));
    }

    #[test]
    fn test_enum_and_fixed() {
        let schema = Schema::parse_str(
            r#"{"type": "record", "name": "E", "fields": [
                {"name": "level", "type": {"type": "enum", "name": "Level", "symbols": ["LOW", "MID", "HIGH"]}},
                {"name": "id", "type": {"type": "fixed", "name": "Id", "size": 2}}
            ]}"#,
        )
        .unwrap();

        let value: Value = Record::new()
            .with("level", Value::Enum("HIGH".into()))
            .with("id", Value::Fixed(vec![0xCA, 0xFE]))
            .into();
        assert_eq!(encode(&schema, &value).unwrap(), [0x04, 0xCA, 0xFE]);

        let from_json_like: Value = Record::new().with("level", "MID").with("id", "ok").into();
        assert_eq!(encode(&schema, &from_json_like).unwrap(), [0x02, b'o', b'k']);

        let bad_symbol: Value = Record::new().with("level", "NONE").with("id", "ok").into();
        let err = encode(&schema, &bad_symbol).unwrap_err();
        assert_eq!(details(&err).field, "level");

        let bad_size: Value = Record::new().with("level", "LOW").with("id", Value::Fixed(vec![1])).into();
        let err = encode(&schema, &bad_size).unwrap_err();
        assert_eq!(details(&err).expected, "2 bytes");
    }

    #[test]
    fn test_array_blocks() {
        let schema = Schema::Array(Box::new(Schema::Long));
        assert_eq!(encode(&schema, &Value::Array(vec![])).unwrap(), [0x00]);
        assert_eq!(
            encode(&schema, &Value::Array(vec![Value::Int(3), Value::Long(27)])).unwrap(),
            [0x04, 0x06, 0x36, 0x00]
        );

        let err = encode(&schema, &Value::Array(vec![Value::Int(1), Value::from("x")])).unwrap_err();
        assert_eq!(details(&err).field, "[1]");
    }

    #[test]
    fn test_map_keys_sorted() {
        let schema = Schema::Map(Box::new(Schema::Int));
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::Int(2));
        map.insert("a".to_string(), Value::Int(1));

        let expected = [0x04, 0x02, b'a', 0x02, 0x02, b'b', 0x04, 0x00];
        assert_eq!(encode(&schema, &Value::Map(map)).unwrap(), expected);

        // Records stand in for maps when the value came from JSON
        let record: Value = Record::new().with("b", 2).with("a", 1).into();
        assert_eq!(encode(&schema, &record).unwrap(), expected);
    }

    #[test]
    fn test_map_value_path() {
        let schema = Schema::Map(Box::new(Schema::Int));
        let record: Value = Record::new().with("k", "v").into();
        let err = encode(&schema, &record).unwrap_err();
        assert_eq!(details(&err).field, "[\"k\"]");
    }

    #[test]
    fn test_fingerprint_cached() {
        let encoder = user_encoder();
        assert_eq!(encoder.fingerprint(), encoder.schema().fingerprint());
        assert_eq!(encoder.record_schema().name.fullname(), "User");
    }
}
