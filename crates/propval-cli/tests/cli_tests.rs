//! End-to-end tests for the `propval` binary.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn propval() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("propval");
    cmd.arg("--no-color")
        .env_remove("RUST_LOG")
        .env_remove("PROPVAL__PRESENTER__FALLBACK_MESSAGE")
        .env_remove("PROPVAL__OUTPUT__FORMAT");
    cmd
}

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scripts")
        .join(name)
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

// ── help / version ────────────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    propval()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("replay"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn version_flag() {
    propval()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    propval().arg("explode").assert().code(2);
}

// ── replay ────────────────────────────────────────────────────────────────────

#[test]
fn replay_resubmission_scenario() {
    propval()
        .arg("replay")
        .arg(sample("resubmit.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Property has errors"))
        .stdout(predicate::str::contains("expectation(s) passed"));
}

#[test]
fn replay_model_state_scenario() {
    propval()
        .arg("replay")
        .arg(sample("model_state.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Amount must be positive"));
}

#[test]
fn replay_json_transcript_is_parseable() {
    let output = propval()
        .args(["replay", "--format", "json"])
        .arg(sample("resubmit.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let transcript: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(transcript["failures"], 0);
    assert_eq!(transcript["expectations"], 5);
    assert_eq!(transcript["submittable"], true);
}

#[test]
fn failed_expectation_exits_with_user_error() {
    let dir = TempDir::new().unwrap();
    let script = write(
        &dir,
        "wrong.json",
        r#"{ "steps": [
            { "op": "mount", "property": "title" },
            { "op": "expect", "property": "title", "message": "Something" }
        ] }"#,
    );

    propval()
        .arg("replay")
        .arg(&script)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("expected \"Something\""))
        .stderr(predicate::str::contains("1 of 1 expectation(s) failed"));
}

#[test]
fn fallback_message_flag_overrides_default() {
    let dir = TempDir::new().unwrap();
    let script = write(
        &dir,
        "fallback.json",
        r#"{ "steps": [
            { "op": "mount", "property": "title" },
            { "op": "client", "property": "title", "valid": false },
            { "op": "saving" },
            { "op": "expect", "property": "title", "message": "Fix this field" }
        ] }"#,
    );

    propval()
        .args(["replay", "--fallback-message", "Fix this field"])
        .arg(&script)
        .assert()
        .success();
}

#[test]
fn fallback_message_from_environment() {
    let dir = TempDir::new().unwrap();
    let script = write(
        &dir,
        "env.json",
        r#"{ "steps": [
            { "op": "mount", "property": "title" },
            { "op": "client", "property": "title", "valid": false },
            { "op": "saving" },
            { "op": "expect", "property": "title", "message": "From env" }
        ] }"#,
    );

    propval()
        .env("PROPVAL__PRESENTER__FALLBACK_MESSAGE", "From env")
        .arg("replay")
        .arg(&script)
        .assert()
        .success();
}

#[test]
fn step_on_unmounted_property_is_not_found() {
    let dir = TempDir::new().unwrap();
    let script = write(
        &dir,
        "unmounted.json",
        r#"{ "steps": [ { "op": "unmount", "property": "title" } ] }"#,
    );

    propval()
        .arg("replay")
        .arg(&script)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Step 1 (unmount) failed"));
}

#[test]
fn missing_script_is_not_found() {
    propval()
        .args(["replay", "does-not-exist.json"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Script not found"));
}

#[test]
fn malformed_script_is_user_error() {
    let dir = TempDir::new().unwrap();
    let script = write(&dir, "bad.json", r#"{ "steps": [ { "op": "explode" } ] }"#);

    propval()
        .arg("replay")
        .arg(&script)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid script"))
        .stderr(predicate::str::contains("Known ops"));
}

// ── check ─────────────────────────────────────────────────────────────────────

#[test]
fn check_accepts_sample_scripts() {
    for name in ["resubmit.json", "model_state.json"] {
        propval()
            .arg("check")
            .arg(sample(name))
            .assert()
            .success()
            .stdout(predicate::str::contains("is valid"));
    }
}

#[test]
fn check_reports_each_problem() {
    let dir = TempDir::new().unwrap();
    let script = write(
        &dir,
        "problems.json",
        r#"{ "steps": [
            { "op": "edit", "property": "title", "value": "x" },
            { "op": "expect" }
        ] }"#,
    );

    propval()
        .arg("check")
        .arg(&script)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("step 1:"))
        .stdout(predicate::str::contains("step 2: expect asserts nothing"))
        .stderr(predicate::str::contains("2 problem(s)"));
}

// ── config ────────────────────────────────────────────────────────────────────

#[test]
fn config_get_reads_file() {
    let dir = TempDir::new().unwrap();
    let config = write(
        &dir,
        "propval.toml",
        "[presenter]\nfallback_message = \"Needs attention\"\n",
    );

    propval()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "presenter.fallback_message"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Needs attention"));
}

#[test]
fn config_get_unknown_key_is_config_error() {
    propval()
        .args(["config", "get", "nope"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn missing_explicit_config_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    propval()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .args(["config", "list"])
        .assert()
        .code(4);
}

#[test]
fn config_list_prints_toml() {
    propval()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[presenter]"))
        .stdout(predicate::str::contains("fallback_message"));
}

// ── completions ───────────────────────────────────────────────────────────────

#[test]
fn completions_for_bash() {
    propval()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("propval"));
}
