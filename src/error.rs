//! Error types for Rigger operations.
//!
//! This module defines [`RiggerError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `RiggerError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `RiggerError::Other`) for unexpected errors
//! - Configuration errors abort the run before any action executes; platform
//!   errors follow the failure policy of the action that hit them

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Rigger operations.
#[derive(Debug, Error)]
pub enum RiggerError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a configuration or data file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A resource references a dependency absent from the graph.
    #[error("Resource '{resource}' depends on unknown resource '{dependency}'")]
    MissingDependency {
        resource: String,
        dependency: String,
    },

    /// Resource dependency cycle detected.
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// Target pattern is not a valid glob.
    #[error("Invalid target pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Template source could not be parsed.
    #[error("Failed to parse template {path}: {message}")]
    TemplateParse { path: PathBuf, message: String },

    /// Template execution failed (missing key, bad function call, ...).
    #[error("Failed to render template {path}: {message}")]
    TemplateRender { path: PathBuf, message: String },

    /// A manifest file required locally does not exist.
    #[error("Manifest not found: {path}")]
    ManifestMissing { path: PathBuf },

    /// Remote fetch for a pulled manifest failed.
    #[error("Failed to fetch {url}: {message}")]
    FetchFailed { url: String, message: String },

    /// Platform command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Resource did not become ready within the check retry budget.
    #[error("Resource at {path} not ready: {message}")]
    NotReady { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Rigger operations.
pub type Result<T> = std::result::Result<T, RiggerError>;
