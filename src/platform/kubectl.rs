//! kubectl-backed platform client.

use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info, trace, warn};

use super::PlatformClient;
use crate::error::{Result, RiggerError};

/// Readiness polling bounds: 20 attempts, 500ms apart.
const CHECK_RETRIES: u32 = 20;
const CHECK_SLEEP: Duration = Duration::from_millis(500);

/// Drives a `kubectl` binary found on PATH.
#[derive(Debug, Clone, Default)]
pub struct KubectlClient {
    context: Option<String>,
}

impl KubectlClient {
    /// `context`, when set, is passed as `--context` on every invocation.
    pub fn new(context: Option<String>) -> Self {
        KubectlClient { context }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("kubectl");
        if let Some(context) = &self.context {
            cmd.arg("--context").arg(context);
        }
        cmd
    }

    fn run(&self, args: &[&str], manifest: &Path) -> Result<String> {
        let mut cmd = self.command();
        cmd.args(args).arg(manifest);
        let rendered = render_command(&cmd);
        debug!(command = %rendered, "running kubectl");

        let started = Instant::now();
        let output = cmd.output().map_err(|_| RiggerError::CommandFailed {
            command: rendered.clone(),
            code: None,
        })?;
        let elapsed = started.elapsed();
        if !output.status.success() {
            warn!(
                command = %rendered,
                ?elapsed,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "kubectl failed"
            );
            return Err(RiggerError::CommandFailed {
                command: rendered,
                code: output.status.code(),
            });
        }
        debug!(command = %rendered, ?elapsed, "kubectl finished");
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn check_once(&self, manifest: &Path) -> std::result::Result<(), String> {
        let stdout = self
            .run(&["get", "-o", "json", "-f"], manifest)
            .map_err(|e| e.to_string())?;
        let live: LiveResource =
            serde_json::from_str(&stdout).map_err(|e| format!("unreadable live state: {e}"))?;
        readiness(&live)
    }
}

impl PlatformClient for KubectlClient {
    fn apply(&self, manifest: &Path) -> Result<()> {
        // Read the manifest up front: fails fast when the rendered file is
        // gone and gives tracing the exact content that was submitted.
        let content = fs::read_to_string(manifest).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RiggerError::ManifestMissing {
                path: manifest.to_path_buf(),
            },
            _ => RiggerError::Io(e),
        })?;
        trace!(manifest = %manifest.display(), %content, "submitting manifest");

        let output = self.run(&["apply", "-f"], manifest)?;
        info!(manifest = %manifest.display(), output = %output.trim(), "applied");
        Ok(())
    }

    fn check(&self, manifest: &Path) -> Result<()> {
        let mut last_error = String::new();
        for attempt in 1..=CHECK_RETRIES {
            match self.check_once(manifest) {
                Ok(()) => {
                    info!(manifest = %manifest.display(), attempt, "resource ready");
                    return Ok(());
                }
                Err(message) => {
                    debug!(manifest = %manifest.display(), attempt, %message, "not ready");
                    last_error = message;
                }
            }
            if attempt < CHECK_RETRIES {
                thread::sleep(CHECK_SLEEP);
            }
        }
        Err(RiggerError::NotReady {
            path: manifest.to_path_buf(),
            message: last_error,
        })
    }

    fn delete(&self, manifest: &Path) -> Result<()> {
        let output = self.run(&["delete", "-f"], manifest)?;
        info!(manifest = %manifest.display(), output = %output.trim(), "deleted");
        Ok(())
    }
}

/// The slice of `kubectl get -o json` output readiness looks at.
#[derive(Debug, Default, Deserialize)]
struct LiveResource {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    spec: LiveSpec,
    #[serde(default)]
    status: LiveStatus,
}

#[derive(Debug, Default, Deserialize)]
struct LiveSpec {
    replicas: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveStatus {
    available_replicas: Option<u32>,
}

/// Per-kind readiness rules. Services are ready as soon as they exist;
/// deployments are ready when every declared replica is available; any
/// other kind counts as ready on existence.
fn readiness(live: &LiveResource) -> std::result::Result<(), String> {
    match live.kind.as_str() {
        "Service" => Ok(()),
        "Deployment" => {
            let want = live
                .spec
                .replicas
                .ok_or_else(|| "deployment does not declare spec.replicas".to_string())?;
            let have = live.status.available_replicas.unwrap_or(0);
            if want == have {
                Ok(())
            } else {
                Err(format!("deployment not ready: want {want} replicas, has {have}"))
            }
        }
        _ => Ok(()),
    }
}

fn render_command(cmd: &Command) -> String {
    let mut rendered = cmd.get_program().to_string_lossy().to_string();
    for arg in cmd.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}
