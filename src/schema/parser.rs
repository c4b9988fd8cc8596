//! Schema parser for Avro JSON schema text
//!
//! Rejected at load time (AVRO_INVALID_SCHEMA):
//! - Malformed JSON
//! - Unknown type tags or references to undefined names
//! - Duplicate field names or enum symbols
//! - A named type defined twice
//! - A type referring to itself or an enclosing type (cyclic nesting)
//! - Unions

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult};
use super::types::{EnumSchema, Field, FixedSchema, Name, RecordSchema, Schema};

impl Schema {
    /// Parses a schema from its JSON text.
    pub fn parse_str(text: &str) -> SchemaResult<Schema> {
        let json: Value = serde_json::from_str(text)
            .map_err(|e| SchemaError::invalid_schema(format!("invalid JSON: {}", e)))?;
        Schema::parse(&json)
    }

    /// Parses a schema from an already decoded JSON value.
    pub fn parse(json: &Value) -> SchemaResult<Schema> {
        SchemaParser::default().parse(json, None)
    }
}

/// Tracks named types while walking a schema document.
#[derive(Default)]
struct SchemaParser {
    /// Named types fully defined so far, by full name
    defined: HashMap<String, Schema>,
    /// Named types whose definition is still open (self and ancestors)
    in_progress: HashSet<String>,
}

impl SchemaParser {
    fn parse(&mut self, json: &Value, namespace: Option<&str>) -> SchemaResult<Schema> {
        match json {
            Value::String(tag) => self.parse_tag(tag, namespace),
            Value::Object(obj) => self.parse_object(obj, namespace),
            Value::Array(_) => Err(SchemaError::invalid_schema(
                "union types are not supported",
            )),
            other => Err(SchemaError::invalid_schema(format!(
                "expected a type name or object, got {}",
                other
            ))),
        }
    }

    /// Resolves a primitive tag or a reference to a previously defined type.
    fn parse_tag(&self, tag: &str, namespace: Option<&str>) -> SchemaResult<Schema> {
        if let Some(primitive) = Schema::primitive(tag) {
            return Ok(primitive);
        }

        let candidates = match namespace {
            Some(ns) if !tag.contains('.') => vec![format!("{}.{}", ns, tag), tag.to_string()],
            _ => vec![tag.to_string()],
        };

        for fullname in &candidates {
            if self.in_progress.contains(fullname) {
                return Err(SchemaError::invalid_schema(format!(
                    "cyclic reference to '{}'",
                    fullname
                )));
            }
            if let Some(schema) = self.defined.get(fullname) {
                return Ok(schema.clone());
            }
        }

        Err(SchemaError::invalid_schema(format!("unknown type '{}'", tag)))
    }

    fn parse_object(&mut self, obj: &Map<String, Value>, namespace: Option<&str>) -> SchemaResult<Schema> {
        let type_value = obj
            .get("type")
            .ok_or_else(|| SchemaError::invalid_schema("missing 'type' attribute"))?;

        let tag = match type_value {
            Value::String(tag) => tag.as_str(),
            // {"type": {"type": "array", ...}} wraps a nested definition
            nested => return self.parse(nested, namespace),
        };

        match tag {
            "record" => self.parse_record(obj, namespace),
            "enum" => self.parse_enum(obj, namespace),
            "fixed" => self.parse_fixed(obj, namespace),
            "array" => {
                let items = obj
                    .get("items")
                    .ok_or_else(|| SchemaError::invalid_schema("array is missing 'items'"))?;
                Ok(Schema::Array(Box::new(self.parse(items, namespace)?)))
            }
            "map" => {
                let values = obj
                    .get("values")
                    .ok_or_else(|| SchemaError::invalid_schema("map is missing 'values'"))?;
                Ok(Schema::Map(Box::new(self.parse(values, namespace)?)))
            }
            other => self.parse_tag(other, namespace),
        }
    }

    /// Reads `name`/`namespace`, and reserves the full name.
    fn begin_named(&mut self, obj: &Map<String, Value>, namespace: Option<&str>) -> SchemaResult<Name> {
        let raw_name = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::invalid_schema("named type is missing 'name'"))?;

        let own_namespace = match obj.get("namespace") {
            None | Some(Value::Null) => namespace,
            Some(Value::String(ns)) => Some(ns.as_str()),
            Some(other) => {
                return Err(SchemaError::invalid_schema(format!(
                    "namespace must be a string, got {}",
                    other
                )))
            }
        };

        let name = Name::new(raw_name, own_namespace)?;
        let fullname = name.fullname();

        if Schema::primitive(&name.name).is_some() && name.namespace.is_none() {
            return Err(SchemaError::invalid_schema(format!(
                "'{}' is a primitive type and cannot be redefined",
                fullname
            )));
        }

        if self.defined.contains_key(&fullname) || !self.in_progress.insert(fullname.clone()) {
            return Err(SchemaError::invalid_schema(format!(
                "type '{}' is defined more than once",
                fullname
            )));
        }

        Ok(name)
    }

    fn end_named(&mut self, schema: Schema) -> Schema {
        if let Some(name) = schema.name() {
            let fullname = name.fullname();
            self.in_progress.remove(&fullname);
            self.defined.insert(fullname, schema.clone());
        }
        schema
    }

    fn parse_record(&mut self, obj: &Map<String, Value>, namespace: Option<&str>) -> SchemaResult<Schema> {
        let name = self.begin_named(obj, namespace)?;

        let fields_json = obj
            .get("fields")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SchemaError::invalid_schema(format!("record '{}' is missing 'fields'", name))
            })?;

        let mut fields = Vec::with_capacity(fields_json.len());
        for field_json in fields_json {
            let field_obj = field_json.as_object().ok_or_else(|| {
                SchemaError::invalid_schema(format!("record '{}' has a non-object field", name))
            })?;

            let field_name = field_obj.get("name").and_then(Value::as_str).ok_or_else(|| {
                SchemaError::invalid_schema(format!("record '{}' has a field without 'name'", name))
            })?;

            let field_type = field_obj.get("type").ok_or_else(|| {
                SchemaError::invalid_schema(format!(
                    "field '{}' of record '{}' is missing 'type'",
                    field_name, name
                ))
            })?;

            let mut field = Field::new(field_name, self.parse(field_type, name.namespace.as_deref())?);
            field.doc = doc_of(field_obj);
            fields.push(field);
        }

        let mut record = RecordSchema::new(name, fields)?;
        record.doc = doc_of(obj);
        Ok(self.end_named(Schema::Record(record)))
    }

    fn parse_enum(&mut self, obj: &Map<String, Value>, namespace: Option<&str>) -> SchemaResult<Schema> {
        let name = self.begin_named(obj, namespace)?;

        let symbols = obj
            .get("symbols")
            .and_then(Value::as_array)
            .ok_or_else(|| SchemaError::invalid_schema(format!("enum '{}' is missing 'symbols'", name)))?
            .iter()
            .map(|s| {
                s.as_str().map(str::to_string).ok_or_else(|| {
                    SchemaError::invalid_schema(format!("enum '{}' has a non-string symbol", name))
                })
            })
            .collect::<SchemaResult<Vec<_>>>()?;

        let mut schema = EnumSchema::new(name, symbols)?;
        schema.doc = doc_of(obj);
        Ok(self.end_named(Schema::Enum(schema)))
    }

    fn parse_fixed(&mut self, obj: &Map<String, Value>, namespace: Option<&str>) -> SchemaResult<Schema> {
        let name = self.begin_named(obj, namespace)?;

        let size = obj
            .get("size")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                SchemaError::invalid_schema(format!(
                    "fixed '{}' needs a non-negative integer 'size'",
                    name
                ))
            })?;

        let mut schema = FixedSchema::new(name, size as usize);
        schema.doc = doc_of(obj);
        Ok(self.end_named(Schema::Fixed(schema)))
    }
}

fn doc_of(obj: &Map<String, Value>) -> Option<String> {
    obj.get("doc").and_then(Value::as_str).map(str::to_string)
}
