//! Package metadata (`package.json`) as seen by the classifier.
//!
//! Only a handful of fields matter. Anything that fails to read or parse, or
//! parses to something other than a JSON object, is treated as "no descriptor".

use crate::fs::FileSystem;
use serde_json::{Map, Value};
use std::path::Path;

/// Parsed contents of a directory's package metadata file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageDescriptor {
    fields: Map<String, Value>,
}

impl PackageDescriptor {
    /// Read `dir/<file_name>` through `fs`. `None` on any failure.
    pub fn load(fs: &dyn FileSystem, dir: &Path, file_name: &str) -> Option<Self> {
        let path = dir.join(file_name);
        match fs.read_to_string(&path) {
            Ok(text) => {
                let descriptor = Self::from_json(&text);
                if descriptor.is_none() {
                    tracing::trace!("ignoring unparsable descriptor {}", path.display());
                }
                descriptor
            }
            Err(e) => {
                tracing::trace!("no descriptor at {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn from_json(text: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(text).ok()? {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// True when `key` is present with a truthy value.
    pub fn has_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }

    /// Version of the npm client that installed this package (npm 3/4 era).
    pub fn npm_version(&self) -> Option<&Value> {
        self.get("_npmVersion")
    }

    /// Tarball URL recorded by npm 5+ when installing from a registry.
    pub fn resolved(&self) -> Option<&str> {
        self.get("_resolved").and_then(Value::as_str)
    }

    /// Whether `scripts.<name>` is defined with a truthy value.
    pub fn has_script(&self, name: &str) -> bool {
        self.get("scripts")
            .and_then(Value::as_object)
            .and_then(|scripts| scripts.get(name))
            .is_some_and(is_truthy)
    }

    /// The `main` entry point, if it is a string.
    pub fn main(&self) -> Option<&str> {
        self.get("main").and_then(Value::as_str)
    }
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy, everything else
/// (including empty objects and arrays) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
