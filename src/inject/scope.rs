//! Two-tier template data scope.
//!
//! Each ingested data file writes its keys twice: once into the global
//! scope, where the last writer wins, and once into a sub-mapping keyed by
//! the qualified `<package>_<dataName>` name, which collisions cannot touch.
//! Templates pick whichever addressing mode they want:
//!
//! - `{{.someKey}}` resolves against the global tier
//! - `{{.infra_secrets.someKey}}` resolves against the namespaced tier

use serde_json::{Map, Value};

/// The merged key/value scope templates are rendered against.
///
/// Built once per run, read-only during rendering.
#[derive(Debug, Default)]
pub struct Scope {
    root: Map<String, Value>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one data file into the scope under the qualified name.
    ///
    /// Every key lands in the global tier (overwriting any prior value) and
    /// in the namespaced sub-mapping stored under `qualified`.
    pub fn merge(&mut self, qualified: &str, data: Map<String, Value>) {
        let mut namespaced = Map::new();
        for (key, value) in data {
            let value = flatten(value);
            self.root.insert(key.clone(), value.clone());
            namespaced.insert(key, value);
        }
        self.root
            .insert(qualified.to_string(), Value::Object(namespaced));
    }

    /// Look up a key in the global tier.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// The scope as the object templates navigate from.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Number of keys in the global tier.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// True when nothing has been ingested.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

/// Nested structures are exposed to templates as their serialized JSON form,
/// so they interpolate as opaque scalars instead of structurally.
fn flatten(value: Value) -> Value {
    match value {
        Value::Object(_) | Value::Array(_) => Value::String(value.to_string()),
        scalar => scalar,
    }
}
