//! Integration tests for the engine public API.

use httpmock::prelude::*;
use rigger::engine::{Engine, EngineOptions, FailurePolicy};
use rigger::platform::MockPlatform;
use rigger::RiggerError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Two-package tree: the entry config imports an infra package and the
/// entry's web resource depends on the imported database.
fn setup_tree() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("infra")).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();

    fs::write(
        root.join("rigger.json"),
        r#"{
            "package": "app",
            "imports": ["infra/infra.json"],
            "resources": {
                "web": { "path": "web.yaml", "deps": ["infra.db"] }
            },
            "injects": { "conf": "data/app.json" }
        }"#,
    )
    .unwrap();
    fs::write(root.join("data/app.json"), r#"{"host": "app.local"}"#).unwrap();
    fs::write(
        root.join("web.yaml"),
        "kind: Deployment\nhost: {{.host}}\nbacked-by: {{.infra_conf.engine}}\n",
    )
    .unwrap();

    fs::write(
        root.join("infra/infra.json"),
        r#"{
            "package": "infra",
            "resources": {
                "db": { "path": "db.yaml" }
            },
            "injects": { "conf": "data.json" }
        }"#,
    )
    .unwrap();
    fs::write(root.join("infra/data.json"), r#"{"engine": "postgres"}"#).unwrap();
    fs::write(root.join("infra/db.yaml"), "kind: Service\nengine: {{.engine}}\n").unwrap();

    let entry = root.join("rigger.json");
    (temp, entry)
}

#[test]
fn public_api_is_accessible() {
    let _options = EngineOptions::default();
    let _policy = FailurePolicy::BestEffort;
    let _platform = MockPlatform::new();
}

#[test]
fn load_builds_the_qualified_graph() {
    let (_temp, entry) = setup_tree();
    let platform = MockPlatform::new();

    let engine = Engine::load(&entry, &platform, EngineOptions::default()).unwrap();

    let names: Vec<_> = engine.graph().names().collect();
    assert_eq!(names, vec!["infra.db", "web"]);
}

#[test]
fn apply_renders_and_orders_across_packages() {
    let (temp, entry) = setup_tree();
    let platform = MockPlatform::new();

    let mut engine = Engine::load(&entry, &platform, EngineOptions::default()).unwrap();
    engine.apply("web").unwrap();

    let applied = platform.applied();
    assert_eq!(applied.len(), 2);
    assert!(applied[0].ends_with("infra/db.yaml.inj"));
    assert!(applied[1].ends_with("web.yaml.inj"));

    let web = fs::read_to_string(temp.path().join("web.yaml.inj")).unwrap();
    assert_eq!(web, "kind: Deployment\nhost: app.local\nbacked-by: postgres\n");

    let db = fs::read_to_string(temp.path().join("infra/db.yaml.inj")).unwrap();
    assert_eq!(db, "kind: Service\nengine: postgres\n");
}

#[test]
fn apply_touches_each_resource_once_per_run() {
    let (_temp, entry) = setup_tree();
    let platform = MockPlatform::new();

    let mut engine = Engine::load(&entry, &platform, EngineOptions::default()).unwrap();
    engine.apply("web").unwrap();
    engine.apply("*").unwrap();

    assert_eq!(platform.apply_count("web.yaml"), 1);
    assert_eq!(platform.apply_count("db.yaml"), 1);
}

#[test]
fn check_does_not_expand_dependencies() {
    let (_temp, entry) = setup_tree();
    let platform = MockPlatform::new();

    let engine = Engine::load(&entry, &platform, EngineOptions::default()).unwrap();
    engine.check("web").unwrap();

    let checked = platform.checked();
    assert_eq!(checked.len(), 1);
    assert!(checked[0].ends_with("web.yaml.inj"));
}

#[test]
fn best_effort_delete_continues_and_marks() {
    let (_temp, entry) = setup_tree();
    let mut platform = MockPlatform::new();
    platform.fail_delete_on("db.yaml");

    let mut engine = Engine::load(&entry, &platform, EngineOptions::default()).unwrap();
    engine.delete("*", FailurePolicy::BestEffort).unwrap();
    assert_eq!(platform.deleted().len(), 2);

    // Failed resources still count as handled within the run.
    engine.delete("*", FailurePolicy::BestEffort).unwrap();
    assert_eq!(platform.deleted().len(), 2);
}

#[test]
fn fatal_delete_stops_at_the_first_failure() {
    let (_temp, entry) = setup_tree();
    let mut platform = MockPlatform::new();
    platform.fail_delete_on("db.yaml");

    let mut engine = Engine::load(&entry, &platform, EngineOptions::default()).unwrap();
    let err = engine.delete("*", FailurePolicy::Fatal).unwrap_err();

    assert!(matches!(err, RiggerError::CommandFailed { .. }));
    // infra.db sorts before web, so web is never reached.
    assert_eq!(platform.deleted().len(), 1);
}

#[test]
fn recreate_does_not_apply_after_a_failed_delete() {
    let (_temp, entry) = setup_tree();
    let mut platform = MockPlatform::new();
    platform.fail_delete_on("web.yaml");

    let mut engine = Engine::load(&entry, &platform, EngineOptions::default()).unwrap();
    assert!(engine.recreate("web").is_err());
    assert!(platform.applied().is_empty());
}

#[test]
fn load_rejects_dependency_cycles() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("rigger.json"),
        r#"{
            "package": "app",
            "resources": {
                "a": { "path": "a.yaml", "deps": ["b"] },
                "b": { "path": "b.yaml", "deps": ["a"] }
            }
        }"#,
    )
    .unwrap();

    let platform = MockPlatform::new();
    let err = Engine::load(
        &temp.path().join("rigger.json"),
        &platform,
        EngineOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, RiggerError::CircularDependency { .. }));
}

#[test]
fn prepare_pulls_missing_manifests_once() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/svc.yaml");
        then.status(200).body("kind: Service\nname: {{.name}}\n");
    });

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(
        root.join("rigger.json"),
        format!(
            r#"{{
                "package": "app",
                "resources": {{
                    "svc": {{ "path": "remote/svc.yaml", "href": "{}" }}
                }},
                "injects": {{ "conf": "conf.json" }}
            }}"#,
            server.url("/svc.yaml")
        ),
    )
    .unwrap();
    fs::write(root.join("conf.json"), r#"{"name": "edge"}"#).unwrap();

    let entry = root.join("rigger.json");
    let platform = MockPlatform::new();

    let mut engine = Engine::load(&entry, &platform, EngineOptions::default()).unwrap();
    engine.prepare("svc").unwrap();
    mock.assert();

    let rendered = fs::read_to_string(root.join("remote/svc.yaml.inj")).unwrap();
    assert_eq!(rendered, "kind: Service\nname: edge\n");

    // A later run finds the manifest on disk and does not refetch.
    let mut engine = Engine::load(&entry, &platform, EngineOptions::default()).unwrap();
    engine.prepare("svc").unwrap();
    assert_eq!(mock.hits(), 1);
}

#[test]
fn prepare_renders_without_touching_the_platform() {
    let (_temp, entry) = setup_tree();
    let platform = MockPlatform::new();

    let mut engine = Engine::load(&entry, &platform, EngineOptions::default()).unwrap();
    engine.prepare("*").unwrap();

    assert!(platform.applied().is_empty());
    assert!(platform.checked().is_empty());
    assert!(platform.deleted().is_empty());
}

#[test]
fn unknown_entry_config_fails_to_load() {
    let platform = MockPlatform::new();
    let err = Engine::load(
        Path::new("/nonexistent/rigger.json"),
        &platform,
        EngineOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, RiggerError::ConfigNotFound { .. }));
}
