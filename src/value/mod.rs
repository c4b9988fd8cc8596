//! Value trees supplied to the encoder
//!
//! A value is built by the caller per record and consumed by one encode
//! call. Record fields are looked up by name, so the order in which they
//! were inserted never affects the encoding.

mod json;

pub use json::{from_json_line, ValueSourceError};

use std::collections::BTreeMap;

/// A value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
    /// Raw bytes for a `fixed` schema
    Fixed(Vec<u8>),
    /// Symbol of an `enum` schema
    Enum(String),
    Array(Vec<Value>),
    /// String-keyed map; keys iterate in sorted order
    Map(BTreeMap<String, Value>),
    Record(Record),
}

impl Value {
    /// Returns the kind name used in mismatch details.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Fixed(_) => "fixed",
            Value::Enum(_) => "enum",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }
}

/// Field name to value mapping for a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a field, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = Record::new()
            .with("username", "user1")
            .with("identity", Record::new().with("role", "admin"));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("username"), Some(&Value::String("user1".into())));
        assert!(matches!(record.get("identity"), Some(Value::Record(_))));
        assert!(!record.contains("domain"));
    }

    #[test]
    fn test_insertion_order_irrelevant() {
        let ab = Record::new().with("a", 1).with("b", 2);
        let ba = Record::new().with("b", 2).with("a", 1);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_insert_replaces() {
        let mut record = Record::new();
        assert!(record.insert("a", 1).is_none());
        assert_eq!(record.insert("a", 2), Some(Value::Int(1)));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_from_iterator() {
        let record: Record = vec![("x", 1i64), ("y", 2i64)].into_iter().collect();
        assert_eq!(record.names().collect::<Vec<_>>(), ["x", "y"]);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::from(1i64).kind(), "long");
        assert_eq!(Value::from(1.5f32).kind(), "float");
        assert_eq!(Value::from(vec![0u8]).kind(), "bytes");
        assert_eq!(Value::Enum("A".into()).kind(), "enum");
        assert_eq!(Value::from(Record::new()).kind(), "record");
    }
}
