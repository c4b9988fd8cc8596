//! Parsing Canonical Form and schema fingerprints
//!
//! Canonical form keeps only the attributes that affect the binary
//! encoding, uses full names, orders keys as
//! name, type, fields, symbols, items, values, size
//! and contains no whitespace. A named type appearing a second time is
//! written as its full name.
//!
//! Fingerprints are CRC-64-AVRO (Rabin) over the canonical form bytes.

use std::collections::HashSet;
use std::sync::OnceLock;

use serde_json::{json, Map, Value};

use super::types::{Name, Schema};

/// CRC-64-AVRO fingerprint of the empty input.
pub const EMPTY_FINGERPRINT: u64 = 0xc15d_213a_a4d7_a795;

impl Schema {
    /// Returns the Parsing Canonical Form of this schema.
    pub fn canonical_form(&self) -> String {
        let mut out = String::with_capacity(128);
        let mut seen = HashSet::new();
        write_canonical(self, &mut out, &mut seen);
        out
    }

    /// Returns the CRC-64-AVRO fingerprint of the canonical form.
    pub fn fingerprint(&self) -> u64 {
        rabin_fingerprint(self.canonical_form().as_bytes())
    }

    /// Returns the JSON form of this schema: names, namespaces, docs and
    /// structure. Attributes the model does not keep (`logicalType`,
    /// `aliases`, `default`, custom properties) are not written. Parsing
    /// the result yields an equal schema.
    pub fn to_json(&self) -> Value {
        let mut seen = HashSet::new();
        full_json(self, None, &mut seen)
    }
}

/// Computes the CRC-64-AVRO fingerprint of `data`.
pub fn rabin_fingerprint(data: &[u8]) -> u64 {
    let table = fingerprint_table();
    data.iter().fold(EMPTY_FINGERPRINT, |fp, &b| {
        (fp >> 8) ^ table[((fp ^ b as u64) & 0xff) as usize]
    })
}

fn fingerprint_table() -> &'static [u64; 256] {
    static TABLE: OnceLock<[u64; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0u64; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut fp = i as u64;
            for _ in 0..8 {
                fp = (fp >> 1) ^ (EMPTY_FINGERPRINT & (fp & 1).wrapping_neg());
            }
            *entry = fp;
        }
        table
    })
}

fn write_canonical(schema: &Schema, out: &mut String, seen: &mut HashSet<String>) {
    if let Some(name) = schema.name() {
        let fullname = name.fullname();
        if !seen.insert(fullname.clone()) {
            push_json_string(out, &fullname);
            return;
        }
    }

    match schema {
        Schema::Record(record) => {
            out.push_str("{\"name\":");
            push_json_string(out, &record.name.fullname());
            out.push_str(",\"type\":\"record\",\"fields\":[");
            for (i, field) in record.fields().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str("{\"name\":");
                push_json_string(out, &field.name);
                out.push_str(",\"type\":");
                write_canonical(&field.schema, out, seen);
                out.push('}');
            }
            out.push_str("]}");
        }
        Schema::Enum(e) => {
            out.push_str("{\"name\":");
            push_json_string(out, &e.name.fullname());
            out.push_str(",\"type\":\"enum\",\"symbols\":[");
            for (i, symbol) in e.symbols().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                push_json_string(out, symbol);
            }
            out.push_str("]}");
        }
        Schema::Fixed(f) => {
            out.push_str("{\"name\":");
            push_json_string(out, &f.name.fullname());
            out.push_str(&format!(",\"type\":\"fixed\",\"size\":{}}}", f.size));
        }
        Schema::Array(items) => {
            out.push_str("{\"type\":\"array\",\"items\":");
            write_canonical(items, out, seen);
            out.push('}');
        }
        Schema::Map(values) => {
            out.push_str("{\"type\":\"map\",\"values\":");
            write_canonical(values, out, seen);
            out.push('}');
        }
        primitive => push_json_string(out, primitive.type_name()),
    }
}

fn push_json_string(out: &mut String, s: &str) {
    // Names and symbols are restricted to [A-Za-z0-9_.], so no escaping applies
    out.push('"');
    out.push_str(s);
    out.push('"');
}

/// `enclosing` is the namespace a nested name would inherit on re-parse.
fn full_json(schema: &Schema, enclosing: Option<&str>, seen: &mut HashSet<String>) -> Value {
    if let Some(name) = schema.name() {
        let fullname = name.fullname();
        if !seen.insert(fullname.clone()) {
            return Value::String(fullname);
        }
    }

    let mut obj = Map::new();
    match schema {
        Schema::Record(record) => {
            obj.insert("type".into(), json!("record"));
            insert_name(&mut obj, &record.name, enclosing);
            if let Some(doc) = &record.doc {
                obj.insert("doc".into(), json!(doc));
            }
            let fields: Vec<Value> = record
                .fields()
                .iter()
                .map(|field| {
                    let mut f = Map::new();
                    f.insert("name".into(), json!(field.name));
                    f.insert("type".into(), full_json(&field.schema, record.name.namespace.as_deref(), seen));
                    if let Some(doc) = &field.doc {
                        f.insert("doc".into(), json!(doc));
                    }
                    Value::Object(f)
                })
                .collect();
            obj.insert("fields".into(), Value::Array(fields));
        }
        Schema::Enum(e) => {
            obj.insert("type".into(), json!("enum"));
            insert_name(&mut obj, &e.name, enclosing);
            if let Some(doc) = &e.doc {
                obj.insert("doc".into(), json!(doc));
            }
            obj.insert("symbols".into(), json!(e.symbols()));
        }
        Schema::Fixed(f) => {
            obj.insert("type".into(), json!("fixed"));
            insert_name(&mut obj, &f.name, enclosing);
            if let Some(doc) = &f.doc {
                obj.insert("doc".into(), json!(doc));
            }
            obj.insert("size".into(), json!(f.size));
        }
        Schema::Array(items) => {
            obj.insert("type".into(), json!("array"));
            obj.insert("items".into(), full_json(items, enclosing, seen));
        }
        Schema::Map(values) => {
            obj.insert("type".into(), json!("map"));
            obj.insert("values".into(), full_json(values, enclosing, seen));
        }
        primitive => return json!(primitive.type_name()),
    }
    Value::Object(obj)
}

/// Writes `namespace` whenever it differs from the inherited one; an
/// empty string stands for the null namespace.
fn insert_name(obj: &mut Map<String, Value>, name: &Name, enclosing: Option<&str>) {
    obj.insert("name".into(), json!(name.name));
    if name.namespace.as_deref() != enclosing {
        obj.insert("namespace".into(), json!(name.namespace.as_deref().unwrap_or("")));
    }
}
