//! Schema Invariant Tests
//!
//! - Canonical form ignores formatting, attribute order and docs
//! - Fingerprints follow the canonical form
//! - Registered schemas are immutable
//! - Single-object frames carry the schema fingerprint

use std::fs;

use avroenc::encoder::{RecordEncoder, SINGLE_OBJECT_MARKER};
use avroenc::schema::{rabin_fingerprint, Schema, SchemaRegistry};
use avroenc::value::{Record, Value};
use tempfile::TempDir;

const ORDER: &str = r#"{
    "type": "record",
    "name": "Order",
    "namespace": "shop",
    "doc": "A placed order",
    "fields": [
        {"name": "id", "type": "long", "doc": "order id"},
        {"name": "status", "type": {"type": "enum", "name": "Status", "symbols": ["NEW", "PAID"]}},
        {"name": "amounts", "type": {"type": "map", "values": "double"}}
    ]
}"#;

// =============================================================================
// Canonical Form Tests
// =============================================================================

/// Primitive fingerprints match the published CRC-64-AVRO values.
#[test]
fn test_primitive_fingerprint() {
    let schema = Schema::parse_str(r#""int""#).unwrap();
    assert_eq!(schema.fingerprint().to_le_bytes(), [0x8f, 0x5c, 0x39, 0x3f, 0x1a, 0xd5, 0x75, 0x72]);
    assert_eq!(schema.fingerprint(), rabin_fingerprint(b"\"int\""));
}

/// Whitespace, attribute order and docs do not change the canonical form.
#[test]
fn test_canonical_form_is_stable() {
    let reordered = r#"{"fields": [
            {"type": "long", "name": "id"},
            {"type": {"symbols": ["NEW", "PAID"], "name": "Status", "type": "enum"}, "name": "status"},
            {"type": {"values": "double", "type": "map"}, "name": "amounts"}
        ], "namespace": "shop", "name": "Order", "type": "record"}"#;

    let a = Schema::parse_str(ORDER).unwrap();
    let b = Schema::parse_str(reordered).unwrap();

    assert_eq!(a.canonical_form(), b.canonical_form());
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert!(a.canonical_form().starts_with(r#"{"name":"shop.Order","type":"record""#));
    assert!(!a.canonical_form().contains("doc"));
}

/// A schema change changes the fingerprint.
#[test]
fn test_fingerprint_tracks_changes() {
    let a = Schema::parse_str(ORDER).unwrap();
    let b = Schema::parse_str(&ORDER.replace("\"PAID\"", "\"SHIPPED\"")).unwrap();
    assert_ne!(a.fingerprint(), b.fingerprint());
}

// =============================================================================
// Registry Tests
// =============================================================================

/// Saved schemas load back under their full name.
#[test]
fn test_registry_round_trip_through_directory() {
    let tmp = TempDir::new().unwrap();

    let registry = SchemaRegistry::new(tmp.path());
    let path = registry.save_schema(&Schema::parse_str(ORDER).unwrap()).unwrap();
    assert!(path.ends_with("shop.Order.avsc"));

    let mut reloaded = SchemaRegistry::new(tmp.path());
    reloaded.load_all().unwrap();
    assert_eq!(reloaded.schema_count(), 1);
    assert_eq!(
        reloaded.get("shop.Order").unwrap().fingerprint(),
        Schema::parse_str(ORDER).unwrap().fingerprint()
    );
}

/// A registered name cannot be replaced.
#[test]
fn test_registered_schema_is_immutable() {
    let tmp = TempDir::new().unwrap();
    let mut registry = SchemaRegistry::new(tmp.path());

    registry.register(Schema::parse_str(ORDER).unwrap()).unwrap();
    let err = registry
        .register(Schema::parse_str(&ORDER.replace("long", "int")).unwrap())
        .unwrap_err();

    assert_eq!(err.code().code(), "AVRO_SCHEMA_IMMUTABLE");
    assert!(registry.exists("shop.Order"));
}

/// A broken file fails the whole directory load.
#[test]
fn test_invalid_file_fails_load() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bad.avsc"), r#"{"type": "record", "name": "Bad"}"#).unwrap();

    let mut registry = SchemaRegistry::new(tmp.path());
    let err = registry.load_all().unwrap_err();
    assert!(err.is_invalid_schema());
}

// =============================================================================
// Single-Object Encoding Tests
// =============================================================================

/// Frames are marker, little-endian fingerprint, then the plain encoding.
#[test]
fn test_single_object_frame() {
    let encoder = RecordEncoder::from_schema_str(ORDER).unwrap();
    let value: Value = Record::new()
        .with("id", 42i64)
        .with("status", "PAID")
        .with("amounts", Record::new().with("eur", 9.5))
        .into();

    let frame = encoder.encode_single_object(&value).unwrap();
    let body = encoder.encode(&value).unwrap();

    assert_eq!(&frame[..2], &SINGLE_OBJECT_MARKER);
    assert_eq!(&frame[2..10], &encoder.fingerprint().to_le_bytes());
    assert_eq!(&frame[10..], body.as_slice());
}
