//! Configuration loading and import resolution for Rigger.
//!
//! - Schema definitions in [`schema`]
//! - File loading in [`loader`]
//! - Import closure resolution in [`imports`]
//!
//! # Example
//!
//! ```
//! use rigger::config::load_config_file;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("rigger.json");
//! fs::write(&path, r#"{"package": "app"}"#).unwrap();
//!
//! let config = load_config_file(&path).unwrap();
//! assert_eq!(config.package, "app");
//! ```

pub mod imports;
pub mod loader;
pub mod schema;

// Schema re-exports
pub use schema::{ImportDecl, ManifestConfig, PullPolicy, ResourceConfig};

// Loader re-exports
pub use loader::{load_config_file, load_json_object, parse_config};

// Import resolution re-exports
pub use imports::{normalize_path, resolve_closure};
