//! CLI integration tests for podlink.
//!
//! Each test lays out a consumer project, a sandbox project, a base
//! configuration and a Podlink.toml in a temporary directory, then drives the
//! binary against it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

use podlink::core::project::{Project, SourceTree, PRODUCTS_GROUP};

/// Get the podlink binary command, isolated from the user's global config.
fn podlink(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("podlink").unwrap();
    cmd.env("HOME", home).env_remove("PODLINK_MANIFEST");
    cmd
}

struct Layout {
    tmp: TempDir,
    app_id: String,
}

impl Layout {
    fn root(&self) -> &Path {
        self.tmp.path()
    }

    fn user_project(&self) -> PathBuf {
        self.root().join("App.project.json")
    }

    fn sandbox_project(&self) -> PathBuf {
        self.root().join("Pods").join("Pods.project.json")
    }
}

/// Write the two projects, the base configuration and the manifest.
fn layout() -> Layout {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let mut user = Project::new(root.join("App.project.json"));
    let app_id = user.add_target("App", &["Debug", "Release"]);
    user.save().unwrap();

    let mut sandbox = Project::new(root.join("Pods").join("Pods.project.json"));
    sandbox.add_target("Pods", &["Debug", "Release"]);
    sandbox.file_reference_or_create(
        Some(PRODUCTS_GROUP),
        "libPods-JSONKit.a",
        SourceTree::BuiltProducts,
    );
    sandbox.save().unwrap();

    fs::write(
        root.join("Pods").join("Pods.xcconfig"),
        "OTHER_LDFLAGS = -ObjC\nHEADER_SEARCH_PATHS = ${PODS_ROOT}/Headers\n",
    )
    .unwrap();

    fs::write(
        root.join("Podlink.toml"),
        format!(
            r#"[[integration]]
name = "Pods"
user_project = "App.project.json"
sandbox_project = "Pods/Pods.project.json"
xcconfig = "Pods/Pods.xcconfig"
copy_resources_script = "${{SRCROOT}}/Pods/Pods-resources.sh"
user_targets = ["{app_id}"]

[[integration.library]]
name = "Pods-JSONKit"
"#
        ),
    )
    .unwrap();

    Layout {
        app_id: app_id.to_string(),
        tmp,
    }
}

// ============================================================================
// podlink integrate
// ============================================================================

#[test]
fn test_integrate_updates_both_projects() {
    let layout = layout();

    podlink(layout.root())
        .arg("integrate")
        .current_dir(layout.root())
        .assert()
        .success()
        .stderr(predicate::str::contains("Integrating"))
        .stderr(predicate::str::contains("Finished"));

    let user = Project::load(&layout.user_project()).unwrap();
    let app = user.target(&layout.app_id.as_str().into()).unwrap();
    let scripts: Vec<_> = app.shell_script_phases().map(|p| p.name.as_str()).collect();
    assert_eq!(scripts, vec!["Check Pods Manifest.lock", "Copy Pods Resources"]);
    assert!(app.frameworks_phase().is_some());
    assert!(app
        .build_configurations
        .iter()
        .all(|c| c.base_configuration_reference.is_some()));

    let sandbox = Project::load(&layout.sandbox_project()).unwrap();
    let pods = sandbox.target_named("Pods").unwrap();
    assert_eq!(pods.frameworks_phase().unwrap().files.len(), 1);
}

#[test]
fn test_integrate_is_idempotent() {
    let layout = layout();

    podlink(layout.root())
        .arg("integrate")
        .current_dir(layout.root())
        .assert()
        .success();
    let first = fs::read_to_string(layout.user_project()).unwrap();

    podlink(layout.root())
        .arg("integrate")
        .current_dir(layout.root())
        .assert()
        .success();
    let second = fs::read_to_string(layout.user_project()).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.matches("Check Pods Manifest.lock").count(), 1);
}

#[test]
fn test_integrate_from_subdirectory() {
    let layout = layout();
    let nested = layout.root().join("App").join("Sources");
    fs::create_dir_all(&nested).unwrap();

    podlink(layout.root())
        .arg("integrate")
        .current_dir(&nested)
        .assert()
        .success();

    let user = fs::read_to_string(layout.user_project()).unwrap();
    assert!(user.contains("Copy Pods Resources"));
}

#[test]
fn test_integrate_json_output() {
    let layout = layout();

    podlink(layout.root())
        .args(["integrate", "--message-format", "json"])
        .current_dir(layout.root())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""reason":"section""#))
        .stdout(predicate::str::contains(r#""reason":"integration-finished""#))
        .stdout(predicate::str::contains(r#""name":"Pods""#));
}

#[test]
fn test_integrate_quiet_prints_nothing() {
    let layout = layout();

    podlink(layout.root())
        .args(["integrate", "--quiet"])
        .current_dir(layout.root())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_integrate_unknown_only() {
    let layout = layout();

    podlink(layout.root())
        .args(["integrate", "--only", "Pods-Other"])
        .current_dir(layout.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no integration named `Pods-Other`"));
}

#[test]
fn test_integrate_missing_sandbox_target() {
    let layout = layout();
    let mut sandbox = Project::load(&layout.sandbox_project()).unwrap();
    sandbox.targets.clear();
    sandbox.save().unwrap();
    let before = fs::read_to_string(layout.user_project()).unwrap();

    podlink(layout.root())
        .arg("integrate")
        .current_dir(layout.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no native target named `Pods`"));

    assert_eq!(fs::read_to_string(layout.user_project()).unwrap(), before);
}

#[test]
fn test_integrate_without_manifest() {
    let tmp = TempDir::new().unwrap();

    podlink(tmp.path())
        .arg("integrate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find `Podlink.toml`"));
}

#[test]
fn test_integrate_invalid_manifest() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("Podlink.toml"), "[[integration]]\nname = \"Pods\"\n").unwrap();

    podlink(tmp.path())
        .arg("integrate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}

// ============================================================================
// podlink check
// ============================================================================

#[test]
fn test_check_reports_overrides() {
    let layout = layout();
    let mut user = Project::load(&layout.user_project()).unwrap();
    let target = user.target_mut(&layout.app_id.as_str().into()).unwrap();
    target.configuration_mut("Debug").unwrap().set("OTHER_LDFLAGS", "-lz");
    user.save().unwrap();
    let before = fs::read_to_string(layout.user_project()).unwrap();

    podlink(layout.root())
        .args(["check", "--no-color"])
        .current_dir(layout.root())
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "The target `App [Debug]` overrides the `OTHER_LDFLAGS` build setting defined in `Pods/Pods.xcconfig`.",
        ))
        .stderr(predicate::str::contains("Use the `$(inherited)` flag, or"));

    assert_eq!(fs::read_to_string(layout.user_project()).unwrap(), before);
}

#[test]
fn test_check_disabled_by_project_config() {
    let layout = layout();
    let mut user = Project::load(&layout.user_project()).unwrap();
    let target = user.target_mut(&layout.app_id.as_str().into()).unwrap();
    target.configuration_mut("Debug").unwrap().set("OTHER_LDFLAGS", "-lz");
    user.save().unwrap();

    let config_dir = layout.root().join(".podlink");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[integrate]\ncheck_overrides = false\n").unwrap();

    podlink(layout.root())
        .args(["check", "--no-color"])
        .current_dir(layout.root())
        .assert()
        .success()
        .stderr(predicate::str::contains("overrides").not());
}
