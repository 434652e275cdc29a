//! CLI Integration Tests
//!
//! Tests for umbrella build, check, targets, init and completions.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn umbrella() -> Command {
    let mut cmd = Command::cargo_bin("umbrella").unwrap();
    for var in [
        "UMBRELLA_JSON",
        "UMBRELLA_OUT_DIR",
        "UMBRELLA_PROFILE",
        "UMBRELLA_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

fn write_descriptor(dir: &Path, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("umbrella.toml"), content).unwrap();
}

fn create_umbrella_project(root: &Path) {
    write_descriptor(
        &root.join("core"),
        r#"[module]
name = "core"
targets = ["android", "ios"]
"#,
    );
    write_descriptor(
        root,
        r#"[module]
name = "Umbrella"
targets = ["A", "B-device", "B-sim"]
dependencies = [{ name = "core", path = "core" }, "Analytics"]

[framework]
version = "2.1.0"
deployment-target = "15.1"
export = ["core"]

[android]
namespace = "com.example.umbrella"
"#,
    );
}

fn read_manifest(out_dir: &Path) -> serde_json::Value {
    let content = fs::read_to_string(out_dir.join("artifact.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

// ============================================================================
// Build Command Tests
// ============================================================================

#[test]
fn test_build_writes_artifact() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(temp.path());

    umbrella()
        .current_dir(temp.path())
        .args(["build", "--out-dir", "dist"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Packaged"))
        .stdout(predicate::str::contains("Umbrella.framework"));

    let out_dir = temp.path().join("dist");
    let manifest = read_manifest(&out_dir);
    assert_eq!(manifest["baseName"], "Umbrella");
    assert_eq!(manifest["version"], "2.1.0");
    assert_eq!(manifest["minimumOs"], "15.1");
    assert_eq!(manifest["exports"], serde_json::json!(["core"]));
    assert!(out_dir
        .join("ios/iosArm64/debugFramework/Umbrella.framework/Info.plist")
        .is_file());
    assert!(out_dir.join("android/AndroidManifest.xml").is_file());
    assert!(out_dir.join("Umbrella.podspec").is_file());
}

#[test]
fn test_build_release_json() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(temp.path());

    let output = umbrella()
        .current_dir(temp.path())
        .args(["build", "--release", "--json", "--out-dir", "dist"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["success"], true);
    assert_eq!(summary["profile"], "release");
    assert_eq!(summary["artifact"]["profile"], "release");
    assert_eq!(summary["modules"], 3);
    assert_eq!(summary["prebuiltModules"], 1);
    assert!(temp
        .path()
        .join("dist/ios/iosSimulatorArm64/releaseFramework/Umbrella.framework")
        .is_dir());
}

#[test]
fn test_build_json_from_env() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(temp.path());

    umbrella()
        .current_dir(temp.path())
        .env("UMBRELLA_JSON", "1")
        .env("UMBRELLA_OUT_DIR", "env-out")
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"));

    assert!(temp.path().join("env-out/artifact.json").is_file());
}

#[test]
fn test_build_out_dir_flag_overrides_env() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(temp.path());

    umbrella()
        .current_dir(temp.path())
        .env("UMBRELLA_OUT_DIR", "env-out")
        .args(["build", "--quiet", "--out-dir", "flag-out"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(temp.path().join("flag-out/artifact.json").is_file());
    assert!(!temp.path().join("env-out").exists());
}

#[test]
fn test_build_with_manifest_path() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(&temp.path().join("shared"));

    umbrella()
        .current_dir(temp.path())
        .args(["build", "--manifest-path", "shared", "-q"])
        .assert()
        .success();

    assert!(temp
        .path()
        .join("shared/build/umbrella/artifact.json")
        .is_file());
}

#[test]
fn test_build_discovers_from_subdirectory() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(temp.path());
    let nested = temp.path().join("src/nested");
    fs::create_dir_all(&nested).unwrap();

    umbrella()
        .current_dir(&nested)
        .args(["build", "-q"])
        .assert()
        .success();

    assert!(temp.path().join("build/umbrella/artifact.json").is_file());
}

#[test]
fn test_build_clean_removes_stale_files() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(temp.path());
    let stale = temp.path().join("dist/stale.txt");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "old").unwrap();

    umbrella()
        .current_dir(temp.path())
        .args(["build", "--clean", "-q", "--out-dir", "dist"])
        .assert()
        .success();

    assert!(!stale.exists());
    assert!(temp.path().join("dist/artifact.json").is_file());
}

#[test]
fn test_build_verbose_lists_files() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(temp.path());

    umbrella()
        .current_dir(temp.path())
        .args(["build", "-v"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"))
        .stdout(predicate::str::contains("artifact.json"));
}

#[test]
fn test_build_invalid_profile() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(temp.path());

    umbrella()
        .current_dir(temp.path())
        .args(["build", "--profile", "turbo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("turbo"));
}

#[test]
fn test_build_without_descriptor_fails() {
    let temp = TempDir::new().unwrap();

    umbrella()
        .current_dir(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("umbrella.toml"));
}

#[test]
fn test_build_unknown_platform_names_field() {
    let temp = TempDir::new().unwrap();
    write_descriptor(
        temp.path(),
        r#"[module]
name = "Umbrella"
targets = ["ios", "tvos"]

[framework]
version = "1.0.0"
deployment-target = "15.1"
"#,
    );

    umbrella()
        .current_dir(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("tvos"))
        .stderr(predicate::str::contains("module.targets[1]"));
    assert!(!temp.path().join("build").exists());
}

#[test]
fn test_build_undeclared_export() {
    let temp = TempDir::new().unwrap();
    write_descriptor(
        temp.path(),
        r#"[module]
name = "Umbrella"
targets = ["ios"]
dependencies = ["Core"]

[framework]
version = "1.0.0"
deployment-target = "15.1"
export = ["Network"]
"#,
    );

    umbrella()
        .current_dir(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("framework.export"))
        .stderr(predicate::str::contains("Network"));
}

#[test]
fn test_build_cyclic_dependency() {
    let temp = TempDir::new().unwrap();
    write_descriptor(
        &temp.path().join("auth"),
        r#"[module]
name = "auth"
targets = ["ios"]
dependencies = [{ name = "session", path = "../session" }]
"#,
    );
    write_descriptor(
        &temp.path().join("session"),
        r#"[module]
name = "session"
targets = ["ios"]
dependencies = [{ name = "auth", path = "../auth" }]
"#,
    );
    write_descriptor(
        temp.path(),
        r#"[module]
name = "Umbrella"
targets = ["ios"]
dependencies = [{ name = "auth", path = "auth" }]

[framework]
version = "1.0.0"
deployment-target = "15.1"
"#,
    );

    umbrella()
        .current_dir(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cyclic dependency"));
}

// ============================================================================
// Check Command Tests
// ============================================================================

#[test]
fn test_check_lists_modules_without_writing() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(temp.path());

    umbrella()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("ok Umbrella 2.1.0"))
        .stdout(predicate::str::contains("core (exported)"));

    assert!(!temp.path().join("build").exists());
}

#[test]
fn test_check_json() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(temp.path());

    let output = umbrella()
        .current_dir(temp.path())
        .args(["check", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], true);
    assert_eq!(
        report["artifact"]["targets"],
        serde_json::json!(["android", "iosArm64", "iosSimulatorArm64"])
    );
}

#[test]
fn test_check_malformed_descriptor() {
    let temp = TempDir::new().unwrap();
    write_descriptor(
        temp.path(),
        r#"[module]
name = "Umbrella"
targets = []
"#,
    );

    umbrella()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("module.targets"));
}

// ============================================================================
// Targets Command Tests
// ============================================================================

#[test]
fn test_targets_resolves_identifiers() {
    umbrella()
        .args(["targets", "ios", "A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("iosX64"))
        .stdout(predicate::str::contains("iosArm64"))
        .stdout(predicate::str::contains("iosSimulatorArm64"))
        .stdout(predicate::str::contains("android"));
}

#[test]
fn test_targets_json_deduplicates() {
    let output = umbrella()
        .args(["targets", "--json", "ios-simulator", "ios"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let targets: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = targets
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["iosX64", "iosSimulatorArm64", "iosArm64"]);
}

#[test]
fn test_targets_from_descriptor() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(temp.path());

    umbrella()
        .current_dir(temp.path())
        .arg("targets")
        .assert()
        .success()
        .stdout(predicate::str::contains("android"))
        .stdout(predicate::str::contains("iosSimulatorArm64"));
}

#[test]
fn test_targets_unknown_identifier() {
    umbrella()
        .args(["targets", "ios", "linux"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("linux"));
}

#[test]
fn test_targets_list() {
    umbrella()
        .args(["targets", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ios-simulator"))
        .stdout(predicate::str::contains("iosX64, iosSimulatorArm64"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_then_check() {
    let temp = TempDir::new().unwrap();

    umbrella()
        .args(["init", "Shared", "--path"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    umbrella()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shared 0.1.0"));
}

#[test]
fn test_init_refuses_existing_descriptor() {
    let temp = TempDir::new().unwrap();
    create_umbrella_project(temp.path());

    umbrella()
        .args(["init", "Shared", "--path"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    umbrella()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("umbrella"));
}
