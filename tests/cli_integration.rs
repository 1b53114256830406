//! CLI integration tests for gobake.
//!
//! Builds run against a shell-script stand-in for the Go compiler that answers
//! `env KEY` from its environment and writes a small file for `build -o PATH`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the gobake binary command with a clean target environment.
fn gobake(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gobake").unwrap();
    cmd.env("HOME", home)
        .env_remove("GOOS")
        .env_remove("GOARCH")
        .env_remove("CGO_ENABLED")
        .env_remove("GOBAKE_COMPILER")
        .env_remove("FAKE_GO_FAIL");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Create a project directory named `widget` inside `tmp`.
fn project(tmp: &TempDir) -> PathBuf {
    let dir = tmp.path().join("widget");
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[cfg(unix)]
const FAKE_GO: &str = r#"#!/bin/sh
if [ "$1" = "env" ]; then
    printenv "$2"
    exit 0
fi
out=""
while [ $# -gt 0 ]; do
    if [ "$1" = "-o" ]; then
        out="$2"
    fi
    shift
done
if [ "$GOOS/$GOARCH" = "$FAKE_GO_FAIL" ]; then
    echo "fake-go: refusing $GOOS/$GOARCH" >&2
    exit 3
fi
printf '%s/%s cgo=%s\n' "$GOOS" "$GOARCH" "$CGO_ENABLED" > "$out"
"#;

/// Write the fake compiler script and return its path.
#[cfg(unix)]
fn fake_go(tmp: &TempDir) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = tmp.path().join("fake-go");
    fs::write(&path, FAKE_GO).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

// ============================================================================
// gobake targets
// ============================================================================

#[test]
fn test_targets_lists_matrix_in_order() {
    let tmp = temp_dir();

    let output = gobake(tmp.path())
        .arg("targets")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().map(str::trim).collect();
    assert_eq!(
        lines,
        vec![
            "1. windows/amd64",
            "2. windows/arm64",
            "3. linux/amd64",
            "4. linux/arm64"
        ]
    );
}

#[test]
fn test_targets_json() {
    let tmp = temp_dir();

    gobake(tmp.path())
        .args(["--message-format", "json", "targets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reason\":\"targets\""))
        .stdout(predicate::str::contains("app_windows_arm64.exe"));
}

// ============================================================================
// gobake completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    gobake(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gobake"));
}

// ============================================================================
// gobake build
// ============================================================================

#[test]
fn test_build_rejects_unsupported_target() {
    let tmp = temp_dir();
    let dir = project(&tmp);

    gobake(tmp.path())
        .args(["build", "--target", "darwin/arm64", "--compiler", "go-not-installed"])
        .current_dir(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid target `darwin/arm64`"))
        .stderr(predicate::str::contains("unsupported operating system"));

    assert!(!dir.join("build").exists());
}

#[test]
fn test_build_rejects_out_of_range_index() {
    let tmp = temp_dir();
    let dir = project(&tmp);

    gobake(tmp.path())
        .args(["build", "--target", "9", "--compiler", "go-not-installed"])
        .current_dir(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_build_missing_compiler_fails() {
    let tmp = temp_dir();
    let dir = project(&tmp);

    gobake(tmp.path())
        .args(["build", "--target", "linux/amd64", "--compiler", "go-not-installed-anywhere"])
        .current_dir(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("build for linux/amd64 failed"));
}

#[cfg(unix)]
#[test]
fn test_build_all_targets() {
    let tmp = temp_dir();
    let dir = project(&tmp);
    let go = fake_go(&tmp);

    gobake(tmp.path())
        .args(["build", "--all", "--no-cgo", "--compiler"])
        .arg(&go)
        .current_dir(&dir)
        .assert()
        .success()
        .stderr(predicate::str::contains("4 binaries"));

    let build = dir.join("build");
    assert_eq!(
        fs::read_to_string(build.join("widget_windows_amd64.exe")).unwrap(),
        "windows/amd64 cgo=0\n"
    );
    assert_eq!(
        fs::read_to_string(build.join("widget_windows_arm64.exe")).unwrap(),
        "windows/arm64 cgo=0\n"
    );
    assert_eq!(
        fs::read_to_string(build.join("widget_linux_amd64")).unwrap(),
        "linux/amd64 cgo=0\n"
    );
    assert_eq!(
        fs::read_to_string(build.join("widget_linux_arm64")).unwrap(),
        "linux/arm64 cgo=0\n"
    );
}

#[cfg(unix)]
#[test]
fn test_build_selected_targets_with_cgo() {
    let tmp = temp_dir();
    let dir = project(&tmp);
    let go = fake_go(&tmp);

    gobake(tmp.path())
        .args(["build", "--target", "linux/arm64", "--target", "1", "--cgo"])
        .args(["--package", "svc", "--out-dir", "dist", "--compiler"])
        .arg(&go)
        .current_dir(&dir)
        .assert()
        .success();

    let dist = dir.join("dist");
    let mut names: Vec<String> = fs::read_dir(&dist)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["svc_linux_arm64", "svc_windows_amd64.exe"]);
    assert_eq!(
        fs::read_to_string(dist.join("svc_linux_arm64")).unwrap(),
        "linux/arm64 cgo=1\n"
    );
}

#[cfg(unix)]
#[test]
fn test_build_cgo_follows_toolchain_default() {
    let tmp = temp_dir();
    let dir = project(&tmp);
    let go = fake_go(&tmp);

    gobake(tmp.path())
        .args(["build", "--target", "linux/amd64", "--compiler"])
        .arg(&go)
        .env("CGO_ENABLED", "1")
        .current_dir(&dir)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.join("build/widget_linux_amd64")).unwrap(),
        "linux/amd64 cgo=1\n"
    );
}

#[cfg(unix)]
#[test]
fn test_build_stops_at_first_failure() {
    let tmp = temp_dir();
    let dir = project(&tmp);
    let go = fake_go(&tmp);

    gobake(tmp.path())
        .args(["build", "--all", "--compiler"])
        .arg(&go)
        .env("FAKE_GO_FAIL", "windows/arm64")
        .current_dir(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("build for windows/arm64 failed"))
        .stderr(predicate::str::contains("exited with status 3"));

    let build = dir.join("build");
    assert!(build.join("widget_windows_amd64.exe").exists());
    assert!(!build.join("widget_linux_amd64").exists());
    assert!(!build.join("widget_linux_arm64").exists());
}

#[cfg(unix)]
#[test]
fn test_build_failure_reported_once() {
    let tmp = temp_dir();
    let dir = project(&tmp);
    let go = fake_go(&tmp);

    let output = gobake(tmp.path())
        .args(["build", "--all", "--compiler"])
        .arg(&go)
        .env("FAKE_GO_FAIL", "linux/amd64")
        .current_dir(&dir)
        .output()
        .unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stderr.matches("exited with status 3").count(), 1, "{}", stderr);
    assert_eq!(stderr.matches("error:").count(), 1, "{}", stderr);
    assert!(!stderr.contains("INFO"), "{}", stderr);
    assert_eq!(stderr.matches("Building").count(), 3, "{}", stderr);
}

#[cfg(unix)]
#[test]
fn test_build_output_dir_collision() {
    let tmp = temp_dir();
    let dir = project(&tmp);
    let go = fake_go(&tmp);
    fs::write(dir.join("build"), "not a directory").unwrap();

    gobake(tmp.path())
        .args(["build", "--all", "--compiler"])
        .arg(&go)
        .current_dir(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to create output directory"));
}

#[cfg(unix)]
#[test]
fn test_build_uses_project_config() {
    let tmp = temp_dir();
    let dir = project(&tmp);
    let go = fake_go(&tmp);

    fs::write(
        dir.join("gobake.toml"),
        format!(
            "[build]\npackage = \"tool\"\ncompiler = \"{}\"\ncgo = false\ntargets = [\"linux/amd64\"]\n",
            go.display()
        ),
    )
    .unwrap();

    gobake(tmp.path())
        .arg("build")
        .current_dir(&dir)
        .assert()
        .success();

    let names: Vec<String> = fs::read_dir(dir.join("build"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["tool_linux_amd64"]);
}

#[cfg(unix)]
#[test]
fn test_build_json_events() {
    let tmp = temp_dir();
    let dir = project(&tmp);
    let go = fake_go(&tmp);

    gobake(tmp.path())
        .args(["--message-format", "json", "build", "--target", "linux/amd64", "--compiler"])
        .arg(&go)
        .current_dir(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reason\":\"compiler-artifact\""))
        .stdout(predicate::str::contains("\"reason\":\"environment-restored\""))
        .stdout(predicate::str::contains("\"reason\":\"build-finished\""));
}

// ============================================================================
// gobake env
// ============================================================================

#[cfg(unix)]
#[test]
fn test_env_reports_toolchain_values() {
    let tmp = temp_dir();
    let go = fake_go(&tmp);

    gobake(tmp.path())
        .args(["env", "--compiler"])
        .arg(&go)
        .env("GOOS", "windows")
        .env("GOARCH", "arm64")
        .env("CGO_ENABLED", "0")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("GOOS=windows\n"))
        .stdout(predicate::str::contains("GOARCH=arm64\n"))
        .stdout(predicate::str::contains("CGO_ENABLED=0\n"));
}

#[test]
fn test_env_falls_back_to_host() {
    let tmp = temp_dir();

    gobake(tmp.path())
        .args(["env", "--compiler", "go-not-installed-anywhere"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(host default)"))
        .stderr(predicate::str::contains("was not found in PATH"));
}
