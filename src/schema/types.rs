//! Schema type definitions
//!
//! Supported types:
//! - primitives: null, boolean, int, long, float, double, bytes, string
//! - named: record, enum, fixed
//! - containers: array, map
//!
//! Unions are not supported; every declared field is required.

use std::collections::HashSet;
use std::fmt;

use super::errors::{SchemaError, SchemaResult};

/// A fully parsed schema tree.
///
/// Named types referenced more than once are stored by value at each
/// occurrence, so the tree is finite and free of cycles by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Null,
    Boolean,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit IEEE-754 float
    Float,
    /// 64-bit IEEE-754 float
    Double,
    Bytes,
    /// UTF-8 string
    String,
    Record(RecordSchema),
    Enum(EnumSchema),
    Fixed(FixedSchema),
    /// Homogeneous array with single item type
    Array(Box<Schema>),
    /// String-keyed map with single value type
    Map(Box<Schema>),
}

impl Schema {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Schema::Null => "null",
            Schema::Boolean => "boolean",
            Schema::Int => "int",
            Schema::Long => "long",
            Schema::Float => "float",
            Schema::Double => "double",
            Schema::Bytes => "bytes",
            Schema::String => "string",
            Schema::Record(_) => "record",
            Schema::Enum(_) => "enum",
            Schema::Fixed(_) => "fixed",
            Schema::Array(_) => "array",
            Schema::Map(_) => "map",
        }
    }

    /// Maps a primitive type tag to its schema.
    pub fn primitive(tag: &str) -> Option<Schema> {
        let schema = match tag {
            "null" => Schema::Null,
            "boolean" => Schema::Boolean,
            "int" => Schema::Int,
            "long" => Schema::Long,
            "float" => Schema::Float,
            "double" => Schema::Double,
            "bytes" => Schema::Bytes,
            "string" => Schema::String,
            _ => return None,
        };
        Some(schema)
    }

    /// Returns the name of a named type (record, enum, fixed).
    pub fn name(&self) -> Option<&Name> {
        match self {
            Schema::Record(r) => Some(&r.name),
            Schema::Enum(e) => Some(&e.name),
            Schema::Fixed(f) => Some(&f.name),
            _ => None,
        }
    }

    /// Returns the record schema if this is a record.
    pub fn as_record(&self) -> Option<&RecordSchema> {
        match self {
            Schema::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Short description used in mismatch details: the full name for
    /// named types, the type tag otherwise.
    pub fn describe(&self) -> String {
        match self.name() {
            Some(name) => format!("{} '{}'", self.type_name(), name.fullname()),
            None => match self {
                Schema::Array(items) => format!("array<{}>", items.type_name()),
                Schema::Map(values) => format!("map<{}>", values.type_name()),
                other => other.type_name().to_string(),
            },
        }
    }
}

/// Name of a named type, with an optional dot-separated namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub name: String,
    pub namespace: Option<String>,
}

impl Name {
    /// Creates a name, splitting a dotted full name into namespace and name.
    ///
    /// A namespace embedded in `name` wins over `namespace`. An empty
    /// namespace means the null namespace.
    pub fn new(name: &str, namespace: Option<&str>) -> SchemaResult<Self> {
        let (namespace, name) = match name.rfind('.') {
            Some(pos) => (Some(&name[..pos]), &name[pos + 1..]),
            None => (namespace, name),
        };

        validate_identifier(name)?;

        let namespace = match namespace {
            Some(ns) if !ns.is_empty() => {
                for part in ns.split('.') {
                    validate_identifier(part).map_err(|_| {
                        SchemaError::invalid_schema(format!("invalid namespace '{}'", ns))
                    })?;
                }
                Some(ns.to_string())
            }
            _ => None,
        };

        Ok(Self {
            name: name.to_string(),
            namespace,
        })
    }

    /// Returns `namespace.name`, or just `name` in the null namespace.
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fullname())
    }
}

/// Checks `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn validate_identifier(ident: &str) -> SchemaResult<()> {
    let mut chars = ident.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SchemaError::invalid_schema(format!("invalid name '{}'", ident)))
    }
}

/// A single record field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    pub doc: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            doc: None,
        }
    }
}

/// Record schema: an ordered list of uniquely named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: Name,
    pub doc: Option<String>,
    fields: Vec<Field>,
}

impl RecordSchema {
    /// Creates a record schema, rejecting duplicate or invalid field names.
    pub fn new(name: Name, fields: Vec<Field>) -> SchemaResult<Self> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            validate_identifier(&field.name).map_err(|_| {
                SchemaError::invalid_schema(format!(
                    "invalid field name '{}' in record '{}'",
                    field.name, name
                ))
            })?;
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::invalid_schema(format!(
                    "duplicate field '{}' in record '{}'",
                    field.name, name
                )));
            }
        }

        Ok(Self {
            name,
            doc: None,
            fields,
        })
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Enum schema: an ordered list of unique symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    pub name: Name,
    pub doc: Option<String>,
    symbols: Vec<String>,
}

impl EnumSchema {
    pub fn new(name: Name, symbols: Vec<String>) -> SchemaResult<Self> {
        let mut seen = HashSet::with_capacity(symbols.len());
        for symbol in &symbols {
            validate_identifier(symbol)?;
            if !seen.insert(symbol.as_str()) {
                return Err(SchemaError::invalid_schema(format!(
                    "duplicate symbol '{}' in enum '{}'",
                    symbol, name
                )));
            }
        }

        Ok(Self {
            name,
            doc: None,
            symbols,
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Returns the zero-based index of `symbol`.
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

/// Fixed schema: a fixed number of raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSchema {
    pub name: Name,
    pub doc: Option<String>,
    pub size: usize,
}

impl FixedSchema {
    pub fn new(name: Name, size: usize) -> Self {
        Self {
            name,
            doc: None,
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Name::new(s, None).unwrap()
    }

    #[test]
    fn test_fullname_with_namespace() {
        let n = Name::new("User", Some("com.example")).unwrap();
        assert_eq!(n.fullname(), "com.example.User");
    }

    #[test]
    fn test_dotted_name_overrides_namespace() {
        let n = Name::new("org.other.User", Some("com.example")).unwrap();
        assert_eq!(n.name, "User");
        assert_eq!(n.namespace.as_deref(), Some("org.other"));
    }

    #[test]
    fn test_empty_namespace_is_null() {
        let n = Name::new("User", Some("")).unwrap();
        assert_eq!(n.namespace, None);
        assert_eq!(n.fullname(), "User");
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(Name::new("1abc", None).is_err());
        assert!(Name::new("with-dash", None).is_err());
        assert!(Name::new("", None).is_err());
        assert!(Name::new("User", Some("com..example")).is_err());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = RecordSchema::new(
            name("User"),
            vec![Field::new("a", Schema::String), Field::new("a", Schema::Int)],
        );
        let err = result.unwrap_err();
        assert!(err.is_invalid_schema());
        assert!(err.message().contains("duplicate field 'a'"));
    }

    #[test]
    fn test_field_order_preserved() {
        let record = RecordSchema::new(
            name("User"),
            vec![
                Field::new("zeta", Schema::String),
                Field::new("alpha", Schema::Long),
            ],
        )
        .unwrap();
        let names: Vec<_> = record.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert_eq!(record.field("alpha").unwrap().schema, Schema::Long);
        assert!(record.field("missing").is_none());
    }

    #[test]
    fn test_enum_symbols() {
        let e = EnumSchema::new(name("Role"), vec!["ADMIN".into(), "USER".into()]).unwrap();
        assert_eq!(e.index_of("USER"), Some(1));
        assert_eq!(e.index_of("GUEST"), None);

        let dup = EnumSchema::new(name("Role"), vec!["A".into(), "A".into()]);
        assert!(dup.is_err());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Schema::String.type_name(), "string");
        assert_eq!(Schema::Array(Box::new(Schema::Int)).type_name(), "array");
        assert_eq!(Schema::Array(Box::new(Schema::Int)).describe(), "array<int>");
        let fixed = Schema::Fixed(FixedSchema::new(name("md5"), 16));
        assert_eq!(fixed.describe(), "fixed 'md5'");
    }

    #[test]
    fn test_primitive_lookup() {
        assert_eq!(Schema::primitive("double"), Some(Schema::Double));
        assert_eq!(Schema::primitive("record"), None);
        assert_eq!(Schema::primitive("str"), None);
    }
}
