//! Configuration schema definitions for Rigger.
//!
//! This module contains the struct definitions that map to the JSON
//! configuration file format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Root configuration structure for a rigger.json file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Owning package name; namespaces this file's resources and data
    /// when the file is imported by another.
    pub package: String,

    /// Other configuration files pulled into this one's namespace.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<ImportDecl>,

    /// Named resource declarations.
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceConfig>,

    /// Named data sources: data name to JSON data file path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub injects: BTreeMap<String, PathBuf>,

    /// Target cluster context. The CLI `-C` flag overrides this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// An import declaration: either a bare path string or `{name, path}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportDecl {
    /// Bare path form: `"imports": ["infra/base.json"]`
    Path(PathBuf),
    /// Object form: `"imports": [{"name": "base", "path": "infra/base.json"}]`
    Named {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        path: PathBuf,
    },
}

impl ImportDecl {
    /// The file path this import points at, relative to the declaring file.
    pub fn path(&self) -> &Path {
        match self {
            ImportDecl::Path(path) => path,
            ImportDecl::Named { path, .. } => path,
        }
    }
}

/// A single deployable resource declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Local manifest template path, relative to the declaring file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Remote source to fetch the manifest from, per the pull policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// When to fetch from `href`.
    #[serde(default, skip_serializing_if = "is_default_pull")]
    pub pull: PullPolicy,

    /// Names of resources that must be applied before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<String>,
}

/// When to fetch a resource's manifest from its `href`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PullPolicy {
    /// Always re-fetch into the local path; `href` is required.
    Always,
    /// The local file must already exist.
    Never,
    /// Use the local file if present, otherwise fetch once.
    #[default]
    IfNotPresent,
}

fn is_default_pull(pull: &PullPolicy) -> bool {
    *pull == PullPolicy::IfNotPresent
}
