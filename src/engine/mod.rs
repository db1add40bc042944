//! Orchestration engine.
//!
//! Owns the loaded graph and injector, drives actions against a
//! [`PlatformClient`], and keeps run-scoped idempotency markers so
//! overlapping patterns touch each resource at most once per run.
//!
//! Apply guarantees dependency-before-dependent order by recursively
//! applying each resource's deps ahead of the resource itself. Check and
//! delete deliberately do not expand dependencies: checking a resource
//! must not block on its deps, and deleting one must never cascade.

mod state;

pub use state::RunState;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{load_config_file, normalize_path, resolve_closure};
use crate::error::{Result, RiggerError};
use crate::graph::ResourceGraph;
use crate::inject::{injected_path, Injector};
use crate::platform::PlatformClient;
use crate::pull::{local_target, Puller};

/// How an action treats individual platform failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure.
    Fatal,
    /// Log the failure and keep going.
    BestEffort,
}

/// Engine construction knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Restrict actions to the resources the pattern matches directly,
    /// with no dependency expansion and no recursion.
    pub skip_deps: bool,
}

/// Drives actions over a validated resource graph.
pub struct Engine<'a> {
    graph: ResourceGraph,
    injector: Injector,
    puller: Puller,
    platform: &'a dyn PlatformClient,
    state: RunState,
    skip_deps: bool,
}

impl std::fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("graph", &self.graph)
            .field("injector", &self.injector)
            .field("state", &self.state)
            .field("skip_deps", &self.skip_deps)
            .finish_non_exhaustive()
    }
}

impl<'a> Engine<'a> {
    /// Load the entry config and everything it imports, wire the graph and
    /// injector, and validate before any action can run.
    ///
    /// Graph ingestion takes the entry file's resources under bare names
    /// and each imported file's under qualified names. Inject data is
    /// ingested imported-files-first so the entry file's declarations win
    /// global-scope collisions.
    pub fn load(
        entry: &Path,
        platform: &'a dyn PlatformClient,
        options: EngineOptions,
    ) -> Result<Self> {
        let entry = normalize_path(entry);
        let closure = resolve_closure(&entry)?;

        let entry_config = load_config_file(&entry)?;
        let mut graph = ResourceGraph::new();
        graph.ingest_local(&entry_config, &entry);
        for path in &closure {
            let config = load_config_file(path)?;
            graph.ingest_imported(&config, path);
        }

        let mut injector = Injector::new();
        injector.ingest(&closure)?;
        injector.ingest_file(&entry)?;

        graph.validate()?;
        info!(
            config = %entry.display(),
            resources = graph.len(),
            imports = closure.len(),
            "configuration loaded"
        );

        Ok(Engine {
            graph,
            injector,
            puller: Puller::new(),
            platform,
            state: RunState::new(),
            skip_deps: options.skip_deps,
        })
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    /// Materialize and render every target of `pattern` not yet prepared.
    pub fn prepare(&mut self, pattern: &str) -> Result<()> {
        for name in self.targets(pattern)? {
            if self.state.is_prepared(&name) {
                continue;
            }
            let resource = self.graph.get(&name).ok_or_else(|| unknown_resource(&name))?;
            let manifest = self.puller.materialize(&name, resource)?;
            let rendered = self.injector.render(&manifest)?;
            debug!(resource = %name, manifest = %rendered.display(), "prepared");
            self.state.mark_prepared(&name);
        }
        Ok(())
    }

    /// Prepare every target of `pattern`, then apply each one with its
    /// dependencies applied first. Each resource is submitted and checked
    /// ready before anything depending on it is submitted.
    pub fn apply(&mut self, pattern: &str) -> Result<()> {
        self.prepare(pattern)?;
        for name in self.targets(pattern)? {
            self.apply_resource(&name)?;
        }
        Ok(())
    }

    fn apply_resource(&mut self, name: &str) -> Result<()> {
        if self.state.is_applied(name) {
            return Ok(());
        }
        let deps = match self.graph.get(name) {
            Some(resource) => resource.deps.clone(),
            None => return Err(unknown_resource(name)),
        };
        if !self.skip_deps {
            for dep in &deps {
                self.apply_resource(dep)?;
            }
        }

        let manifest = self.rendered_manifest(name)?;
        info!(resource = %name, "applying");
        self.platform.apply(&manifest)?;
        self.platform.check(&manifest)?;
        self.state.mark_applied(name);
        Ok(())
    }

    /// Check readiness of the resources matching `pattern`. No dependency
    /// expansion; the first failure aborts.
    pub fn check(&self, pattern: &str) -> Result<()> {
        for name in self.graph.matching(pattern)? {
            let manifest = self.rendered_manifest(&name)?;
            info!(resource = %name, "checking");
            self.platform.check(&manifest)?;
        }
        Ok(())
    }

    /// Delete the resources matching `pattern`. No dependency expansion.
    ///
    /// Under [`FailurePolicy::BestEffort`] a platform failure is logged,
    /// the resource is still marked deleted, and teardown continues. Under
    /// [`FailurePolicy::Fatal`] the first failure aborts unmarked.
    pub fn delete(&mut self, pattern: &str, policy: FailurePolicy) -> Result<()> {
        for name in self.graph.matching(pattern)? {
            if self.state.is_deleted(&name) {
                continue;
            }
            let manifest = self.rendered_manifest(&name)?;
            info!(resource = %name, "deleting");
            if let Err(e) = self.platform.delete(&manifest) {
                match policy {
                    FailurePolicy::Fatal => return Err(e),
                    FailurePolicy::BestEffort => {
                        warn!(resource = %name, error = %e, "delete failed, continuing");
                    }
                }
            }
            self.state.mark_deleted(&name);
        }
        Ok(())
    }

    /// Delete then apply over the same pattern. The delete phase is fatal
    /// here: when it fails, apply never runs.
    pub fn recreate(&mut self, pattern: &str) -> Result<()> {
        self.delete(pattern, FailurePolicy::Fatal)?;
        self.apply(pattern)
    }

    /// The resources an expanding action operates on, in deterministic
    /// order: the dependency closure of `pattern`, or just the direct
    /// matches when deps are skipped.
    fn targets(&self, pattern: &str) -> Result<Vec<String>> {
        let targets = if self.skip_deps {
            self.graph.matching(pattern)?
        } else {
            self.graph.dependency_closure(pattern)?
        };
        if targets.is_empty() {
            warn!(%pattern, "no resources match");
        }
        Ok(targets)
    }

    /// Rendered manifest path for a resource, derived without touching
    /// the network: declared path, or href reinterpreted locally, plus
    /// the rendered suffix.
    fn rendered_manifest(&self, name: &str) -> Result<PathBuf> {
        let resource = self.graph.get(name).ok_or_else(|| unknown_resource(name))?;
        let target = local_target(resource).ok_or_else(|| RiggerError::ConfigValidationError {
            message: format!("resource '{name}' declares neither path nor href"),
        })?;
        Ok(injected_path(&target))
    }
}

fn unknown_resource(name: &str) -> RiggerError {
    RiggerError::ConfigValidationError {
        message: format!("unknown resource '{name}'"),
    }
}
