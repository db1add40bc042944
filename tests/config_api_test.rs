//! Integration tests for config module public API.

use rigger::config::{
    load_config_file, parse_config, resolve_closure, ImportDecl, ManifestConfig, PullPolicy,
};
use rigger::RiggerError;
use std::fs;
use tempfile::TempDir;

#[test]
fn public_api_is_accessible() {
    // Verify types are exported correctly
    let _config = ManifestConfig::default();
    let _policy = PullPolicy::default();
}

#[test]
fn full_config_workflow() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("rigger.json"),
        r#"{
            "package": "app",
            "context": "minikube",
            "imports": ["infra/base.json"],
            "resources": {
                "web": { "path": "web.yaml", "deps": ["infra.db"] },
                "mirror": { "href": "https://example.com/mirror.yaml", "pull": "always" }
            },
            "injects": { "conf": "data/conf.json" }
        }"#,
    )
    .unwrap();

    let config = load_config_file(&temp.path().join("rigger.json")).unwrap();

    assert_eq!(config.package, "app");
    assert_eq!(config.context.as_deref(), Some("minikube"));
    assert_eq!(config.imports.len(), 1);
    assert_eq!(
        config.imports[0].path().to_str(),
        Some("infra/base.json")
    );

    let web = &config.resources["web"];
    assert_eq!(web.path.as_deref().and_then(|p| p.to_str()), Some("web.yaml"));
    assert_eq!(web.pull, PullPolicy::IfNotPresent);
    assert_eq!(web.deps, vec!["infra.db".to_string()]);

    let mirror = &config.resources["mirror"];
    assert_eq!(mirror.pull, PullPolicy::Always);
    assert!(mirror.path.is_none());
}

#[test]
fn named_imports_parse() {
    let config = parse_config(
        r#"{
            "package": "app",
            "imports": [{"name": "base", "path": "infra/base.json"}]
        }"#,
        std::path::Path::new("rigger.json"),
    )
    .unwrap();

    match &config.imports[0] {
        ImportDecl::Named { name, path } => {
            assert_eq!(name.as_deref(), Some("base"));
            assert_eq!(path.to_str(), Some("infra/base.json"));
        }
        other => panic!("expected named import, got {:?}", other),
    }
}

#[test]
fn malformed_json_reports_the_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rigger.json");
    fs::write(&path, "{ not json").unwrap();

    let err = load_config_file(&path).unwrap_err();
    match err {
        RiggerError::ConfigParseError { path: reported, .. } => {
            assert!(reported.ends_with("rigger.json"));
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn missing_config_is_its_own_error() {
    let temp = TempDir::new().unwrap();
    let err = load_config_file(&temp.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, RiggerError::ConfigNotFound { .. }));
}

#[test]
fn import_closure_walks_breadth_first_and_dedups() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("infra")).unwrap();

    // entry imports base and net; both import shared
    fs::write(
        root.join("rigger.json"),
        r#"{"package": "app", "imports": ["infra/base.json", "infra/net.json"]}"#,
    )
    .unwrap();
    fs::write(
        root.join("infra/base.json"),
        r#"{"package": "base", "imports": ["shared.json"]}"#,
    )
    .unwrap();
    fs::write(
        root.join("infra/net.json"),
        r#"{"package": "net", "imports": ["shared.json"]}"#,
    )
    .unwrap();
    fs::write(root.join("infra/shared.json"), r#"{"package": "shared"}"#).unwrap();

    let closure = resolve_closure(&root.join("rigger.json")).unwrap();
    let names: Vec<_> = closure
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();

    assert_eq!(names, vec!["base.json", "net.json", "shared.json"]);
}

#[test]
fn import_paths_resolve_relative_to_the_declaring_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("a/b")).unwrap();

    fs::write(
        root.join("rigger.json"),
        r#"{"package": "app", "imports": ["a/mid.json"]}"#,
    )
    .unwrap();
    fs::write(
        root.join("a/mid.json"),
        r#"{"package": "mid", "imports": ["b/leaf.json"]}"#,
    )
    .unwrap();
    fs::write(root.join("a/b/leaf.json"), r#"{"package": "leaf"}"#).unwrap();

    let closure = resolve_closure(&root.join("rigger.json")).unwrap();
    assert_eq!(closure.len(), 2);
    assert!(closure[1].ends_with("a/b/leaf.json"));
}

#[test]
fn missing_import_fails_the_closure() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("rigger.json"),
        r#"{"package": "app", "imports": ["ghost.json"]}"#,
    )
    .unwrap();

    let err = resolve_closure(&temp.path().join("rigger.json")).unwrap_err();
    assert!(matches!(err, RiggerError::ConfigNotFound { .. }));
}
