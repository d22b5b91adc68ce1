//! Integration tests for slackdef

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn slackdef_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("slackdef");
    cmd.env("SLACKDEF_CONFIG", fixture("slackdef.toml"));
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Isolated HOME and writable config file for commands that persist state
struct Harness {
    home: TempDir,
    config_path: PathBuf,
}

impl Harness {
    fn new() -> Option<Self> {
        let home = TempDir::new().ok()?;
        let config_path = home.path().join("slackdef.toml");
        Some(Harness { home, config_path })
    }

    fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("slackdef");
        cmd.env("HOME", self.home.path());
        cmd.env("SLACKDEF_CONFIG", &self.config_path);
        cmd.env_remove("RUST_LOG");
        cmd.current_dir(self.home.path());
        cmd
    }

    fn path(&self, name: &str) -> PathBuf {
        self.home.path().join(name)
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    let content = fs::read_to_string(path).unwrap_or_default();
    serde_json::from_str(&content).unwrap_or_default()
}

#[test]
fn test_version() {
    slackdef_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("slackdef"));
}

#[test]
fn test_help() {
    slackdef_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Slack app manifests"));
}

#[test]
fn test_invalid_command() {
    slackdef_cmd().arg("invalid").assert().failure();
}

#[test]
fn test_build_hosted_to_stdout() {
    slackdef_cmd()
        .arg("build")
        .arg(fixture("hosted.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"function_runtime\": \"slack\""))
        .stdout(predicate::str::contains("\"#/functions/file_incident\""))
        .stdout(predicate::str::contains("\"datastore:write\""));
}

#[test]
fn test_build_compact_is_single_line() {
    let output = slackdef_cmd()
        .args(["build", "--compact"])
        .arg(fixture("remote.json"))
        .output();
    let Ok(output) = output else {
        panic!("failed to run slackdef");
    };
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("\"function_runtime\":\"remote\""));
    assert!(stdout.contains("\"socket_mode_enabled\":true"));
    assert!(!stdout.contains("outgoing_domains"));
}

#[test]
fn test_build_writes_output_file() {
    let Some(env) = Harness::new() else {
        return;
    };
    let output = env.path("out/manifest.json");

    env.command()
        .arg("build")
        .arg(fixture("hosted.yaml"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let manifest = read_json(&output);
    assert_eq!(manifest["display_information"]["name"], "Incident Bot");
    assert_eq!(manifest["features"]["bot_user"]["display_name"], "incident-bot");
    assert_eq!(manifest["outgoing_domains"][0], "status.example.com");
    assert_eq!(
        manifest["oauth_config"]["scopes"]["bot"],
        serde_json::json!(["chat:write", "datastore:read", "datastore:write"])
    );
    assert!(manifest["types"]["incident"].is_object());
    assert!(manifest["types"]["severity"].is_object());
}

#[test]
fn test_build_cyclic_types() {
    let Some(env) = Harness::new() else {
        return;
    };
    let output = env.path("graph.json");

    env.command()
        .arg("build")
        .arg(fixture("cyclic.toml"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let manifest = read_json(&output);
    assert_eq!(manifest["types"]["node"]["properties"]["next"]["type"], "#/types/edge");
    assert_eq!(manifest["types"]["edge"]["properties"]["target"]["type"], "#/types/node");
}

#[test]
fn test_build_uses_configured_defaults() {
    let Some(env) = Harness::new() else {
        return;
    };
    let config = format!(
        "default-definition = \"{}\"\noutput-path = \"{}\"\npretty = false\n",
        fixture("remote.json").display(),
        env.path("configured.json").display()
    );
    assert!(fs::write(&env.config_path, config).is_ok());

    env.command().arg("build").assert().success();

    let content = fs::read_to_string(env.path("configured.json")).unwrap_or_default();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("\"Remote App\""));
}

#[test]
fn test_build_without_definition_fails() {
    let Some(env) = Harness::new() else {
        return;
    };
    env.command()
        .arg("build")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No definition file given"));
}

#[test]
fn test_build_unknown_type_fails() {
    slackdef_cmd()
        .arg("build")
        .arg(fixture("unknown_type.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("'ghost'"));
}

#[test]
fn test_types_lists_discovered_types() {
    slackdef_cmd()
        .arg("types")
        .arg(fixture("hosted.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Types:"))
        .stdout(predicate::str::contains("incident"))
        .stdout(predicate::str::contains("severity"))
        .stdout(predicate::str::contains("file_incident"))
        .stdout(predicate::str::contains("send_message").not());
}

#[test]
fn test_init_creates_definition_once() {
    let Some(env) = Harness::new() else {
        return;
    };

    env.command().arg("init").assert().success();
    assert!(env.path("manifest.yaml").exists());

    env.command()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    env.command()
        .args(["build", "manifest.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create_ticket"));
}

#[test]
fn test_config_show() {
    slackdef_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration:"));
}

#[test]
fn test_config_path() {
    slackdef_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slackdef.toml"));
}

#[test]
fn test_config_set_and_show() {
    let Some(env) = Harness::new() else {
        return;
    };

    env.command()
        .args(["config", "set", "output-path", "build/manifest.json"])
        .assert()
        .success();

    env.command()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("output-path"))
        .stdout(predicate::str::contains("build/manifest.json"));

    env.command()
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}
