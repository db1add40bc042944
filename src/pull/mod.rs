//! Pull policies: materializing manifests on local disk.
//!
//! A resource's manifest either already exists at its declared `path` or is
//! fetched from its `href`. The pull policy decides which, per resource:
//! `never` trusts the local file, `ifNotPresent` fetches only when the
//! local target is absent, `always` refetches on every run. Templating and
//! platform calls always operate on the local target this module returns.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::config::PullPolicy;
use crate::error::{Result, RiggerError};
use crate::graph::Resource;

/// Fetches remote manifests according to each resource's pull policy.
pub struct Puller {
    client: Client,
}

impl Puller {
    /// Create a puller with the default 30-second fetch timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Puller {
            client: Client::builder()
                .user_agent("rigger")
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Ensure the manifest behind `resource` exists locally and return the
    /// path every later stage works against. `name` labels errors.
    pub fn materialize(&self, name: &str, resource: &Resource) -> Result<PathBuf> {
        match resource.pull {
            PullPolicy::Never => {
                let path = resource.path.as_deref().ok_or_else(|| {
                    RiggerError::ConfigValidationError {
                        message: format!("resource '{name}' sets pull: never without a local path"),
                    }
                })?;
                if !path.exists() {
                    return Err(RiggerError::ManifestMissing {
                        path: path.to_path_buf(),
                    });
                }
                Ok(path.to_path_buf())
            }
            PullPolicy::IfNotPresent => {
                let target = local_target(resource).ok_or_else(|| no_source(name))?;
                if target.exists() {
                    debug!(resource = name, path = %target.display(), "manifest already present");
                    return Ok(target);
                }
                let href = resource.href.as_deref().ok_or_else(|| {
                    RiggerError::ConfigValidationError {
                        message: format!(
                            "resource '{name}' is missing at '{}' and declares no href to pull from",
                            target.display()
                        ),
                    }
                })?;
                self.fetch(href, &target)?;
                Ok(target)
            }
            PullPolicy::Always => {
                let href = resource.href.as_deref().ok_or_else(|| {
                    RiggerError::ConfigValidationError {
                        message: format!("resource '{name}' sets pull: always without an href"),
                    }
                })?;
                let target = local_target(resource).ok_or_else(|| no_source(name))?;
                self.fetch(href, &target)?;
                Ok(target)
            }
        }
    }

    fn fetch(&self, href: &str, target: &Path) -> Result<()> {
        let url = normalize_url(href);
        info!(%url, target = %target.display(), "pulling manifest");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| RiggerError::FetchFailed {
                url: url.clone(),
                message: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(RiggerError::FetchFailed {
                url,
                message: format!("HTTP {}", response.status()),
            });
        }
        let body = response.bytes().map_err(|e| RiggerError::FetchFailed {
            url,
            message: e.to_string(),
        })?;

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(target, &body)?;
        Ok(())
    }
}

impl Default for Puller {
    fn default() -> Self {
        Self::new()
    }
}

/// The local path a resource materializes at: its declared path, or its
/// href reinterpreted as a relative path when no path is declared.
pub fn local_target(resource: &Resource) -> Option<PathBuf> {
    match (&resource.path, &resource.href) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(href)) => Some(PathBuf::from(strip_scheme(href))),
        (None, None) => None,
    }
}

/// Scheme-less hrefs get https prepended; hrefs that already carry a
/// scheme are fetched as written.
fn normalize_url(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("https://{href}")
    }
}

fn strip_scheme(href: &str) -> &str {
    href.strip_prefix("https://")
        .or_else(|| href.strip_prefix("http://"))
        .unwrap_or(href)
}

fn no_source(name: &str) -> RiggerError {
    RiggerError::ConfigValidationError {
        message: format!("resource '{name}' declares neither path nor href"),
    }
}
