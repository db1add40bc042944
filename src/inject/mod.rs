//! Data injection and manifest rendering.
//!
//! Config files declare named JSON data files under `injects`. The injector
//! loads every declaration into a [`Scope`] (flat keys plus
//! `<package>_<name>` namespaced maps), then renders each manifest template
//! against that scope into a `.inj` sibling file. Deploy actions always
//! operate on the rendered sibling, never the source manifest.

pub mod functions;
pub mod scope;
pub mod template;
pub mod unescape;

pub use functions::TemplateFn;
pub use scope::Scope;
pub use template::Template;
pub use unescape::unescape_entities;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{load_config_file, load_json_object, normalize_path};
use crate::error::{Result, RiggerError};

/// Accumulates inject data across config files and renders manifests.
#[derive(Debug, Default)]
pub struct Injector {
    scope: Scope,
}

impl Injector {
    pub fn new() -> Self {
        Injector {
            scope: Scope::new(),
        }
    }

    /// Ingest the `injects` declarations of each config file, in order.
    /// Later files win collisions on the flat tier.
    pub fn ingest(&mut self, config_paths: &[PathBuf]) -> Result<()> {
        for path in config_paths {
            self.ingest_file(path)?;
        }
        Ok(())
    }

    /// Ingest one config file. Data paths resolve relative to the file's
    /// directory; each entry lands in scope as `<package>_<name>`.
    pub fn ingest_file(&mut self, config_path: &Path) -> Result<()> {
        let config = load_config_file(config_path)?;
        let dir = config_path.parent().unwrap_or_else(|| Path::new(""));
        for (name, data_path) in &config.injects {
            let resolved = normalize_path(&dir.join(data_path));
            let data = load_json_object(&resolved)?;
            let qualified = format!("{}_{}", config.package, name);
            debug!(
                data = %resolved.display(),
                scope = %qualified,
                keys = data.len(),
                "ingested inject data"
            );
            self.scope.merge(&qualified, data);
        }
        Ok(())
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Render the manifest at `path` into its `.inj` sibling and return the
    /// sibling's path. The render is a full rewrite, so repeated calls with
    /// the same scope produce identical output.
    pub fn render(&self, path: &Path) -> Result<PathBuf> {
        let source = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RiggerError::ManifestMissing {
                path: path.to_path_buf(),
            },
            _ => RiggerError::Io(e),
        })?;
        let template = Template::parse(&source, path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let rendered = template.render(self.scope.as_map(), base_dir)?;
        let rendered = unescape_entities(&rendered);
        let target = injected_path(path);
        fs::write(&target, rendered)?;
        info!(manifest = %path.display(), rendered = %target.display(), "rendered manifest");
        Ok(target)
    }
}

/// The rendered sibling of a manifest path: `web.yaml` becomes
/// `web.yaml.inj`.
pub fn injected_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".inj");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn injected_path_appends_suffix() {
        assert_eq!(
            injected_path(Path::new("deploy/web.yaml")),
            PathBuf::from("deploy/web.yaml.inj")
        );
    }

    #[test]
    fn render_writes_sibling_with_substituted_values() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "vals.json", r#"{"key": "v"}"#);
        let config = write_file(
            temp.path(),
            "rigger.json",
            r#"{"package": "app", "injects": {"vals": "vals.json"}}"#,
        );
        let manifest = write_file(temp.path(), "web.yaml", "value: {{.key}}\n");

        let mut injector = Injector::new();
        injector.ingest(&[config]).unwrap();
        let rendered = injector.render(&manifest).unwrap();

        assert_eq!(rendered, temp.path().join("web.yaml.inj"));
        assert_eq!(fs::read_to_string(rendered).unwrap(), "value: v\n");
    }

    #[test]
    fn namespaced_lookup_survives_flat_collisions() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "a.json", r#"{"port": 80}"#);
        write_file(temp.path(), "b.json", r#"{"port": 443}"#);
        let first = write_file(
            temp.path(),
            "first.json",
            r#"{"package": "net", "injects": {"ports": "a.json"}}"#,
        );
        let second = write_file(
            temp.path(),
            "second.json",
            r#"{"package": "edge", "injects": {"ports": "b.json"}}"#,
        );
        let manifest = write_file(
            temp.path(),
            "svc.yaml",
            "flat: {{.port}}\nnet: {{.net_ports.port}}\n",
        );

        let mut injector = Injector::new();
        injector.ingest(&[first, second]).unwrap();
        let rendered = injector.render(&manifest).unwrap();

        assert_eq!(
            fs::read_to_string(rendered).unwrap(),
            "flat: 443\nnet: 80\n"
        );
    }

    #[test]
    fn data_paths_resolve_relative_to_declaring_config() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "deploy/data/vals.json", r#"{"name": "api"}"#);
        let config = write_file(
            temp.path(),
            "deploy/rigger.json",
            r#"{"package": "svc", "injects": {"vals": "data/vals.json"}}"#,
        );

        let mut injector = Injector::new();
        injector.ingest_file(&config).unwrap();

        assert_eq!(
            injector.scope().get("name"),
            Some(&serde_json::Value::String("api".to_string()))
        );
    }

    #[test]
    fn rendered_output_is_entity_unescaped() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "vals.json", r#"{"motd": "a &amp; b"}"#);
        let config = write_file(
            temp.path(),
            "rigger.json",
            r#"{"package": "app", "injects": {"vals": "vals.json"}}"#,
        );
        let manifest = write_file(temp.path(), "cfg.yaml", "motd: {{.motd}}\n");

        let mut injector = Injector::new();
        injector.ingest(&[config]).unwrap();
        let rendered = injector.render(&manifest).unwrap();

        assert_eq!(fs::read_to_string(rendered).unwrap(), "motd: a & b\n");
    }

    #[test]
    fn render_missing_manifest_reports_path() {
        let injector = Injector::new();
        let err = injector.render(Path::new("/nonexistent/web.yaml")).unwrap_err();
        assert!(matches!(err, RiggerError::ManifestMissing { .. }));
        assert!(err.to_string().contains("web.yaml"));
    }

    #[test]
    fn render_is_idempotent_for_a_fixed_scope() {
        let temp = TempDir::new().unwrap();
        let manifest = write_file(temp.path(), "plain.yaml", "static: true\n");

        let injector = Injector::new();
        let first = injector.render(&manifest).unwrap();
        let before = fs::read_to_string(&first).unwrap();
        let second = injector.render(&manifest).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(second).unwrap(), before);
    }
}
