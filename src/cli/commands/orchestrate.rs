//! Resource orchestration commands: apply, check, delete, recreate, inject.

use std::path::PathBuf;

use tracing::debug;

use crate::cli::args::{Cli, TargetArgs};
use crate::cli::commands::{Command, CommandResult};
use crate::config::load_config_file;
use crate::engine::{Engine, EngineOptions, FailurePolicy};
use crate::error::Result;
use crate::platform::{KubectlClient, PlatformClient};

/// Engine operation an orchestrate command drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Apply,
    Check,
    Delete,
    Recreate,
    Inject,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Apply => "apply",
            Action::Check => "check",
            Action::Delete => "delete",
            Action::Recreate => "recreate",
            Action::Inject => "inject",
        }
    }
}

/// Command that loads the config and runs one engine action.
pub struct OrchestrateCommand {
    action: Action,
    config: PathBuf,
    target: String,
    context: Option<String>,
    skip_deps: bool,
}

impl OrchestrateCommand {
    pub fn new(action: Action, cli: &Cli, args: &TargetArgs) -> Self {
        Self {
            action,
            config: cli.config.clone(),
            target: args.target.clone(),
            context: cli.context.clone(),
            skip_deps: cli.skip_deps,
        }
    }

    /// The -C flag wins over the entry config's context field.
    fn resolve_context(&self) -> Result<Option<String>> {
        if self.context.is_some() {
            return Ok(self.context.clone());
        }
        Ok(load_config_file(&self.config)?.context)
    }

    fn run(&self, platform: &dyn PlatformClient) -> Result<()> {
        let options = EngineOptions {
            skip_deps: self.skip_deps,
        };
        let mut engine = Engine::load(&self.config, platform, options)?;
        match self.action {
            Action::Apply => engine.apply(&self.target),
            Action::Check => engine.check(&self.target),
            Action::Delete => engine.delete(&self.target, FailurePolicy::BestEffort),
            Action::Recreate => engine.recreate(&self.target),
            Action::Inject => engine.prepare(&self.target),
        }
    }
}

impl Command for OrchestrateCommand {
    fn execute(&self) -> Result<CommandResult> {
        debug!("Running {} against '{}'", self.action.name(), self.target);
        let context = self.resolve_context()?;
        let client = KubectlClient::new(context);
        self.run(&client)?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatform;
    use std::fs;
    use tempfile::TempDir;

    fn command(action: Action, dir: &TempDir, target: &str, skip_deps: bool) -> OrchestrateCommand {
        OrchestrateCommand {
            action,
            config: dir.path().join("rigger.json"),
            target: target.to_string(),
            context: None,
            skip_deps,
        }
    }

    fn write_fixture(dir: &TempDir) {
        fs::write(
            dir.path().join("rigger.json"),
            r#"{
                "package": "demo",
                "context": "minikube",
                "resources": {
                    "db": { "path": "db.yaml" },
                    "web": { "path": "web.yaml", "deps": ["db"] }
                }
            }"#,
        )
        .unwrap();
        fs::write(dir.path().join("db.yaml"), "kind: Service\n").unwrap();
        fs::write(dir.path().join("web.yaml"), "kind: Deployment\n").unwrap();
    }

    #[test]
    fn apply_walks_dependencies() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);
        let platform = MockPlatform::default();

        command(Action::Apply, &dir, "web", false)
            .run(&platform)
            .unwrap();

        let applied = platform.applied();
        assert_eq!(applied.len(), 2);
        assert!(applied[0].ends_with("db.yaml.inj"));
        assert!(applied[1].ends_with("web.yaml.inj"));
    }

    #[test]
    fn apply_with_skip_deps_touches_only_the_match() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);
        let platform = MockPlatform::default();

        command(Action::Apply, &dir, "web", true)
            .run(&platform)
            .unwrap();

        let applied = platform.applied();
        assert_eq!(applied.len(), 1);
        assert!(applied[0].ends_with("web.yaml.inj"));
    }

    #[test]
    fn inject_renders_without_touching_the_platform() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);
        let platform = MockPlatform::default();

        command(Action::Inject, &dir, "*", false)
            .run(&platform)
            .unwrap();

        assert!(dir.path().join("db.yaml.inj").exists());
        assert!(dir.path().join("web.yaml.inj").exists());
        assert!(platform.applied().is_empty());
        assert!(platform.deleted().is_empty());
    }

    #[test]
    fn delete_continues_past_failures() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);
        let mut platform = MockPlatform::default();
        platform.fail_delete_on("db.yaml");

        command(Action::Delete, &dir, "*", false)
            .run(&platform)
            .unwrap();

        assert_eq!(platform.deleted().len(), 2);
    }

    #[test]
    fn flag_context_wins_over_config_context() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);

        let mut cmd = command(Action::Check, &dir, "*", false);
        assert_eq!(cmd.resolve_context().unwrap().as_deref(), Some("minikube"));

        cmd.context = Some("staging".to_string());
        assert_eq!(cmd.resolve_context().unwrap().as_deref(), Some("staging"));
    }
}
