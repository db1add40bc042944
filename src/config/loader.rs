//! Configuration file loading.
//!
//! Reads and parses rigger.json configuration files and the JSON data
//! files referenced by their `injects` sections.

use std::fs;
use std::path::Path;

use crate::config::schema::ManifestConfig;
use crate::error::{Result, RiggerError};

/// Load a single configuration file and parse it into [`ManifestConfig`].
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the JSON is invalid.
pub fn load_config_file(path: &Path) -> Result<ManifestConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RiggerError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RiggerError::Io(e)
        }
    })?;
    parse_config(&content, path)
}

/// Parse configuration content, labelling parse errors with the source path.
pub fn parse_config(content: &str, path: &Path) -> Result<ManifestConfig> {
    serde_json::from_str(content).map_err(|e| RiggerError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a JSON data file as a flat object (top-level key/value map).
///
/// Used for the files referenced by a config's `injects` section.
pub fn load_json_object(path: &Path) -> Result<serde_json::Map<String, serde_json::Value>> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RiggerError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RiggerError::Io(e)
        }
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| RiggerError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(RiggerError::ConfigParseError {
            path: path.to_path_buf(),
            message: format!("expected a JSON object, got {}", json_type_name(&other)),
        }),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
