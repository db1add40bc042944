//! Resource dependency graph.
//!
//! Resources declared by the entry config are keyed by bare name; resources
//! pulled in through imports are keyed `<package>.<name>`. Dependencies are
//! exact names, action targets are shell-style glob patterns matched against
//! the full key. Validation runs once before any action and covers
//! everything the apply recursion relies on.

mod cycle;

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::config::{normalize_path, ManifestConfig, PullPolicy};
use crate::error::{Result, RiggerError};

/// A deployable resource with its source location and dependency edges
/// resolved to run-time form.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Local manifest path, resolved against the declaring config file.
    pub path: Option<PathBuf>,
    /// Remote source for pullable resources.
    pub href: Option<String>,
    pub pull: PullPolicy,
    /// Fully qualified names of resources that must be applied first.
    pub deps: Vec<String>,
}

/// All known resources, keyed by qualified name.
#[derive(Debug, Default)]
pub struct ResourceGraph {
    resources: BTreeMap<String, Resource>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        ResourceGraph {
            resources: BTreeMap::new(),
        }
    }

    /// Ingest the entry config's resources under their bare names. Dep
    /// names are taken verbatim; they may point at imported resources by
    /// qualified name.
    pub fn ingest_local(&mut self, config: &ManifestConfig, config_path: &Path) {
        let dir = parent_dir(config_path);
        for (name, declared) in &config.resources {
            self.insert(
                name.clone(),
                Resource {
                    path: declared.path.as_ref().map(|p| normalize_path(&dir.join(p))),
                    href: declared.href.clone(),
                    pull: declared.pull,
                    deps: declared.deps.clone(),
                },
            );
        }
    }

    /// Ingest an imported config's resources under `<package>.<name>`.
    /// Unqualified dep names are prefixed with the declaring package, so a
    /// dep written inside an imported file resolves within that package
    /// rather than against the entry file.
    pub fn ingest_imported(&mut self, config: &ManifestConfig, config_path: &Path) {
        let dir = parent_dir(config_path);
        for (name, declared) in &config.resources {
            let deps = declared
                .deps
                .iter()
                .map(|dep| {
                    if dep.contains('.') {
                        dep.clone()
                    } else {
                        format!("{}.{}", config.package, dep)
                    }
                })
                .collect();
            self.insert(
                format!("{}.{}", config.package, name),
                Resource {
                    path: declared.path.as_ref().map(|p| normalize_path(&dir.join(p))),
                    href: declared.href.clone(),
                    pull: declared.pull,
                    deps,
                },
            );
        }
    }

    fn insert(&mut self, name: String, resource: Resource) {
        if self.resources.insert(name.clone(), resource).is_some() {
            debug!(resource = %name, "resource redeclared, later declaration wins");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// All resource names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Names matching `pattern`, in sorted order. Matching is glob-style
    /// against the full qualified name, never substring search.
    pub fn matching(&self, pattern: &str) -> Result<Vec<String>> {
        let matcher = Pattern::new(pattern).map_err(|e| RiggerError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(self
            .resources
            .keys()
            .filter(|name| matcher.matches(name))
            .cloned()
            .collect())
    }

    /// Matching names expanded through dependency edges, breadth-first, in
    /// discovery order with each name listed once.
    pub fn dependency_closure(&self, pattern: &str) -> Result<Vec<String>> {
        let matched = self.matching(pattern)?;
        let mut seen: HashSet<String> = matched.iter().cloned().collect();
        let mut queue: VecDeque<String> = matched.into_iter().collect();
        let mut closure = Vec::new();
        while let Some(name) = queue.pop_front() {
            if let Some(resource) = self.resources.get(&name) {
                for dep in &resource.deps {
                    if seen.insert(dep.clone()) {
                        queue.push_back(dep.clone());
                    }
                }
            }
            closure.push(name);
        }
        Ok(closure)
    }

    /// Check every invariant the actions rely on: dep references resolve,
    /// each resource has a usable source, `pull: always` has an href to
    /// pull, and the dependency edges are acyclic.
    pub fn validate(&self) -> Result<()> {
        for (name, resource) in &self.resources {
            for dep in &resource.deps {
                if !self.resources.contains_key(dep) {
                    return Err(RiggerError::MissingDependency {
                        resource: name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
            if resource.path.is_none() && resource.href.is_none() {
                return Err(RiggerError::ConfigValidationError {
                    message: format!("resource '{name}' declares neither path nor href"),
                });
            }
            if resource.pull == PullPolicy::Always && resource.href.is_none() {
                return Err(RiggerError::ConfigValidationError {
                    message: format!("resource '{name}' sets pull: always without an href"),
                });
            }
            debug!(resource = %name, deps = ?resource.deps, "graph node");
        }
        if let Some(cycle) = cycle::find_cycle(&self.resources) {
            return Err(RiggerError::CircularDependency {
                cycle: cycle.join(" -> "),
            });
        }
        debug!(resources = self.resources.len(), "resource graph validated");
        Ok(())
    }
}

fn parent_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new(""))
}
