//! Integration tests for the agentstory binary
//!
//! Each test runs with an isolated AGENTSTORY_DIR so no user config is read.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn demo_spec() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join("joke-agent.yaml")
}

/// Helper to run agentstory with a custom config directory
fn run_agentstory(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_agentstory"))
        .env("AGENTSTORY_DIR", dir)
        .env_remove("AGENTSTORY_CONFIG")
        .env("HOME", dir)
        .env("XDG_DATA_HOME", dir.join("data"))
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute agentstory")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_export_writes_directory_and_archive() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let spec = demo_spec();

    let output = run_agentstory(
        temp.path(),
        &["export", spec.to_str().unwrap(), "--out", out.to_str().unwrap(), "-o", "json"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["root"], "joke-agent");
    assert_eq!(report["skill_count"], 1);

    assert!(out.join("joke-agent/agent.md").exists());
    assert!(out.join("joke-agent/skills/tell-jokes/SKILL.md").exists());
    assert!(out.join("joke-agent.tar.gz").exists());
}

#[test]
fn test_export_dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let spec = demo_spec();

    let output = run_agentstory(
        temp.path(),
        &["export", spec.to_str().unwrap(), "--out", out.to_str().unwrap(), "--dry-run", "-o", "json"],
    );
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["dry_run"], true);
    assert!(!out.exists());
}

#[test]
fn test_config_archive_disabled() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("agentstory.yaml"), "archive:\n  enabled: false\n").unwrap();
    let out = temp.path().join("out");
    let spec = demo_spec();

    let output = run_agentstory(
        temp.path(),
        &["export", spec.to_str().unwrap(), "--out", out.to_str().unwrap(), "-o", "json"],
    );
    assert!(output.status.success());
    assert!(out.join("joke-agent/agent.md").exists());
    assert!(!out.join("joke-agent.tar.gz").exists());
}

#[test]
fn test_harness_list() {
    let temp = TempDir::new().unwrap();
    let output = run_agentstory(temp.path(), &["harness", "list", "-o", "json"]);
    assert!(output.status.success());

    let adapters: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let ids: Vec<&str> = adapters.as_array().unwrap().iter().map(|a| a["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["claude-code", "letta", "langgraph", "agents-md"]);
}

#[test]
fn test_harness_export_targets() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let spec = demo_spec();

    let output = run_agentstory(
        temp.path(),
        &[
            "harness",
            "export",
            spec.to_str().unwrap(),
            "-t",
            "claude-code",
            "-t",
            "langgraph",
            "--out",
            out.to_str().unwrap(),
            "-o",
            "json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    assert!(out.join("joke-agent-claude-code/CLAUDE.md").exists());
    assert!(out.join("joke-agent-claude-code/.claude/commands/tell-jokes.md").exists());
    assert!(out.join("joke-agent-langgraph/agent.py").exists());
    assert!(!out.join("joke-agent-letta").exists());
}

#[test]
fn test_harness_try() {
    let temp = TempDir::new().unwrap();
    let spec = demo_spec();

    let output = run_agentstory(temp.path(), &["harness", "try", spec.to_str().unwrap(), "langgraph", "-o", "json"]);
    assert!(output.status.success());
    let config: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(config["launch"]["type"], "command");
    assert_eq!(config["launch"]["command"], "langgraph dev");

    let output = run_agentstory(temp.path(), &["harness", "try", spec.to_str().unwrap(), "autogen"]);
    assert!(!output.status.success());
}

#[test]
fn test_skill_pack_and_inspect() {
    let temp = TempDir::new().unwrap();
    let spec = demo_spec();

    let output = run_agentstory(temp.path(), &["skill", "pack", spec.to_str().unwrap(), "Tell Jokes"]);
    assert!(output.status.success());
    let artifact = stdout(&output);
    assert!(artifact.starts_with("---\nname: tell-jokes\n"));

    let skill_md = temp.path().join("SKILL.md");
    fs::write(&skill_md, &artifact).unwrap();
    let output = run_agentstory(temp.path(), &["skill", "inspect", skill_md.to_str().unwrap(), "-o", "json"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["name"], "tell-jokes");
    assert_eq!(report["license"], "MIT");
    assert_eq!(report["problems"].as_array().unwrap().len(), 0);
}

#[test]
fn test_validate() {
    let temp = TempDir::new().unwrap();
    let output = run_agentstory(temp.path(), &["validate", demo_spec().to_str().unwrap(), "-o", "json"]);
    assert!(output.status.success());

    let broken = temp.path().join("broken.yaml");
    fs::write(&broken, "name: Broken\nskills:\n  - name: Nothing\n").unwrap();
    let output = run_agentstory(temp.path(), &["validate", broken.to_str().unwrap(), "-o", "json"]);
    assert!(!output.status.success());
}

#[test]
fn test_config_show_uses_agentstory_dir() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("agentstory.yaml"), "log_level: warn\n").unwrap();

    let output = run_agentstory(temp.path(), &["config", "show", "-o", "yaml"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("log_level: warn"));
}
