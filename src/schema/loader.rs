//! Schema registry backed by a directory of `.avsc` files
//!
//! - One file per schema, named `<fullname>.avsc`
//! - Schemas are indexed by the full name of their top-level type
//! - A registered schema is immutable
//! - Malformed schema files fail the whole load

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::observability::{log_event_with_fields, Event};

use super::errors::{SchemaError, SchemaResult};
use super::types::Schema;

/// Schema registry that reads schema files from disk and keeps them in memory.
///
/// Loaded schemas are handed out as `Arc<Schema>` so encoders on any
/// thread can share them read-only.
pub struct SchemaRegistry {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Loaded schemas indexed by full name
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    /// Creates a registry over the given schema directory.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `.avsc` file in the schema directory.
    ///
    /// A missing directory holds no schemas.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "avsc") {
                paths.push(path);
            }
        }

        // Directory order is platform dependent
        paths.sort();
        for path in paths {
            self.load_schema_file(&path)?;
        }

        let count = self.schemas.len().to_string();
        log_event_with_fields(Event::SchemasLoaded, &[("count", &count)]);

        Ok(())
    }

    /// Loads and registers a single schema file.
    pub fn load_schema_file(&mut self, path: &Path) -> SchemaResult<Arc<Schema>> {
        let schema = read_schema_file(path)?;
        self.register(schema)
    }

    /// Registers a schema under the full name of its top-level type.
    pub fn register(&mut self, schema: Schema) -> SchemaResult<Arc<Schema>> {
        let fullname = registry_key(&schema)?;

        if self.schemas.contains_key(&fullname) {
            return Err(SchemaError::schema_immutable(fullname));
        }

        let schema = Arc::new(schema);
        self.schemas.insert(fullname, Arc::clone(&schema));
        Ok(schema)
    }

    /// Gets a schema by full name.
    pub fn get(&self, fullname: &str) -> Option<Arc<Schema>> {
        self.schemas.get(fullname).cloned()
    }

    /// Checks if a schema exists.
    pub fn exists(&self, fullname: &str) -> bool {
        self.schemas.contains_key(fullname)
    }

    /// Returns the full names of all loaded schemas, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Saves a schema to `<schema_dir>/<fullname>.avsc`.
    ///
    /// Refuses to overwrite an existing file.
    pub fn save_schema(&self, schema: &Schema) -> SchemaResult<PathBuf> {
        let fullname = registry_key(schema)?;
        let path = self.schema_dir.join(format!("{}.avsc", fullname));

        if path.exists() {
            return Err(SchemaError::schema_immutable(fullname));
        }

        fs::create_dir_all(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to create schema directory: {}", e),
            )
        })?;

        let content = serde_json::to_string_pretty(&schema.to_json()).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to serialize schema: {}", e),
            )
        })?;

        fs::write(&path, content).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to write file: {}", e),
            )
        })?;

        Ok(path)
    }
}

/// Reads and parses one schema file without registering it.
pub fn read_schema_file(path: &Path) -> SchemaResult<Schema> {
    let content = fs::read_to_string(path).map_err(|e| {
        SchemaError::malformed_schema(path.display().to_string(), format!("Failed to read file: {}", e))
    })?;

    Schema::parse_str(&content)
        .map_err(|e| SchemaError::malformed_schema(path.display().to_string(), e.message()))
}

fn registry_key(schema: &Schema) -> SchemaResult<String> {
    schema
        .name()
        .map(|n| n.fullname())
        .ok_or_else(|| {
            SchemaError::invalid_schema(format!(
                "only named types can be registered, got '{}'",
                schema.type_name()
            ))
        })
}
