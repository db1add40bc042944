//! Rigger - declarative deployment orchestration.
//!
//! Rigger reads a JSON config describing platform resources, renders their
//! manifests from JSON data files, and rolls them out in dependency order.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Config loading, import closure resolution, and schemas
//! - [`engine`] - Action orchestration over the resource graph
//! - [`error`] - Error types and result aliases
//! - [`graph`] - Resource dependency graph, matching, and validation
//! - [`inject`] - Data scoping and manifest template rendering
//! - [`platform`] - Platform client for applying and checking manifests
//! - [`pull`] - Remote manifest retrieval and pull policies
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//!
//! use rigger::inject::Template;
//!
//! // Render a manifest template against injected data
//! let template = Template::parse("port: {{.port | quote}}", Path::new("svc.yaml")).unwrap();
//! let mut scope = serde_json::Map::new();
//! scope.insert("port".to_string(), serde_json::json!(8080));
//! let rendered = template.render(&scope, Path::new(".")).unwrap();
//! assert_eq!(rendered, "port: \"8080\"");
//! ```
//!
//! For file-based config loading, see the integration tests.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod inject;
pub mod platform;
pub mod pull;

pub use error::{Result, RiggerError};
