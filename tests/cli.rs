//! Binary-level tests for the `deep-intel` CLI.
//!
//! Only commands that need no model access are exercised here.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn deep_intel(db: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("deep-intel").unwrap_or_else(|_| unreachable!());
    cmd.arg("--db-path").arg(db.path().join("intel.db"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("deep-intel").unwrap_or_else(|_| unreachable!());
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("research"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn test_history_on_fresh_database() {
    let db = TempDir::new().unwrap_or_else(|_| unreachable!());
    deep_intel(&db)
        .arg("history")
        .assert()
        .success()
        .stdout("No reports saved.\n");
}

#[test]
fn test_history_json_is_empty_array() {
    let db = TempDir::new().unwrap_or_else(|_| unreachable!());
    deep_intel(&db)
        .args(["--format", "json", "history"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[]"));
}

#[test]
fn test_prompt_set_then_get_roundtrip() {
    let db = TempDir::new().unwrap_or_else(|_| unreachable!());
    deep_intel(&db)
        .args(["prompt", "set", "planner", "Plan with three bullets."])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved prompt 'planner'"));

    deep_intel(&db)
        .args(["prompt", "get", "planner"])
        .assert()
        .success()
        .stdout("Plan with three bullets.\n");

    deep_intel(&db)
        .args(["prompt", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("planner"));
}

#[test]
fn test_prompt_unknown_key_fails() {
    let db = TempDir::new().unwrap_or_else(|_| unreachable!());
    deep_intel(&db)
        .args(["prompt", "get", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown prompt key"));
}

#[test]
fn test_init_prompts_into_directory() {
    let db = TempDir::new().unwrap_or_else(|_| unreachable!());
    let prompts = TempDir::new().unwrap_or_else(|_| unreachable!());
    deep_intel(&db)
        .arg("init-prompts")
        .arg(prompts.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 8 prompt template(s)"));

    deep_intel(&db)
        .arg("init-prompts")
        .arg(prompts.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exist"));
}

#[test]
fn test_invalid_domain_fails() {
    let db = TempDir::new().unwrap_or_else(|_| unreachable!());
    deep_intel(&db)
        .args(["discover", "--domain", "retail"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid argument"));
}

#[test]
fn test_research_without_api_key_fails() {
    let db = TempDir::new().unwrap_or_else(|_| unreachable!());
    deep_intel(&db)
        .env_remove("INTEL_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .args(["research", "Acme Corp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key missing"));
}

#[test]
fn test_snapshots_for_unknown_entity() {
    let db = TempDir::new().unwrap_or_else(|_| unreachable!());
    deep_intel(&db)
        .args(["snapshots", "Acme"])
        .assert()
        .success()
        .stdout("No snapshots saved.\n");
}
