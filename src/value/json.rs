//! JSON value source
//!
//! JSON carries no int/long or bytes/string distinction, so numbers map
//! to the narrowest value kind and the encoder's promotion rules take it
//! from there.

use serde_json::Value as Json;
use thiserror::Error;

use super::{Record, Value};

/// Errors raised while reading values, before any schema is involved.
#[derive(Debug, Error)]
pub enum ValueSourceError {
    #[error("line {line}: invalid JSON: {source}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: unsupported number {number}")]
    UnsupportedNumber { line: usize, number: String },
}

impl Value {
    /// Converts a decoded JSON document into a value tree.
    ///
    /// Integers within `i32` become `Int`, other integers `Long`, and
    /// every other number `Double`. Objects become records.
    pub fn from_json(json: &Json) -> Option<Value> {
        let value = match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Boolean(*b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    match i32::try_from(i) {
                        Ok(small) => Value::Int(small),
                        Err(_) => Value::Long(i),
                    }
                } else if n.is_u64() {
                    // Above i64::MAX: no Avro integer holds it
                    return None;
                } else {
                    Value::Double(n.as_f64()?)
                }
            }
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Array(
                items.iter().map(Value::from_json).collect::<Option<Vec<_>>>()?,
            ),
            Json::Object(obj) => {
                let mut record = Record::new();
                for (k, v) in obj {
                    record.insert(k.clone(), Value::from_json(v)?);
                }
                Value::Record(record)
            }
        };
        Some(value)
    }
}

/// Parses one NDJSON line into a value tree.
///
/// `line` is the 1-based line number used in error messages.
pub fn from_json_line(text: &str, line: usize) -> Result<Value, ValueSourceError> {
    let json: Json = serde_json::from_str(text)
        .map_err(|source| ValueSourceError::InvalidJson { line, source })?;

    Value::from_json(&json).ok_or_else(|| ValueSourceError::UnsupportedNumber {
        line,
        number: first_unsupported_number(&json).unwrap_or_default(),
    })
}

fn first_unsupported_number(json: &Json) -> Option<String> {
    match json {
        Json::Number(n) if n.as_i64().is_none() && n.is_u64() => Some(n.to_string()),
        Json::Array(items) => items.iter().find_map(first_unsupported_number),
        Json::Object(obj) => obj.values().find_map(first_unsupported_number),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_widths() {
        assert_eq!(Value::from_json(&json!(7)), Some(Value::Int(7)));
        assert_eq!(Value::from_json(&json!(-2147483648i64)), Some(Value::Int(i32::MIN)));
        assert_eq!(Value::from_json(&json!(2147483648i64)), Some(Value::Long(2147483648)));
        assert_eq!(Value::from_json(&json!(1.25)), Some(Value::Double(1.25)));
    }

    #[test]
    fn test_nested_object_becomes_record() {
        let value = Value::from_json(&json!({
            "username": "user1",
            "identity": {"role": "admin", "domain": "domain1"}
        }))
        .unwrap();

        let expected = Record::new()
            .with("username", "user1")
            .with("identity", Record::new().with("role", "admin").with("domain", "domain1"));
        assert_eq!(value, Value::Record(expected));
    }

    #[test]
    fn test_array_and_null() {
        let value = Value::from_json(&json!([null, true, "x"])).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![Value::Null, Value::Boolean(true), Value::String("x".into())])
        );
    }

    #[test]
    fn test_line_errors() {
        let err = from_json_line("{oops", 3).unwrap_err();
        assert!(matches!(err, ValueSourceError::InvalidJson { line: 3, .. }));
        assert!(err.to_string().starts_with("line 3"));

        let err = from_json_line(r#"{"n": 18446744073709551615}"#, 9).unwrap_err();
        match err {
            ValueSourceError::UnsupportedNumber { line, number } => {
                assert_eq!(line, 9);
                assert_eq!(number, "18446744073709551615");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
