//! Integration tests for the ask command
//!
//! Only guardrail rejections are exercised here, which never reach the
//! language model or the search service.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tutorloop_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tutorloop").unwrap();
    cmd.env("TUTORLOOP_DB", dir.path().join("kb.sqlite"))
        .env("TUTORLOOP_LLM_URL", "http://127.0.0.1:9")
        .env("TUTORLOOP_SEARCH_URL", "http://127.0.0.1:9")
        .env_remove("TUTORLOOP_CONFIG")
        .arg("--config")
        .arg(dir.path().join("config.yml"));
    cmd
}

#[test]
fn test_ask_off_topic_is_rejected() {
    let dir = TempDir::new().unwrap();

    tutorloop_cmd(&dir)
        .arg("ask")
        .arg("what's")
        .arg("the")
        .arg("weather")
        .arg("today")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Error: "))
        .stdout(predicate::str::contains("mathematics-related"));
}

#[test]
fn test_ask_short_query_is_rejected() {
    let dir = TempDir::new().unwrap();

    tutorloop_cmd(&dir)
        .args(["ask", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Query too short"));
}

#[test]
fn test_ask_json_reports_disposition() {
    let dir = TempDir::new().unwrap();

    let output = tutorloop_cmd(&dir)
        .args(["--format", "json", "ask", "tell me a joke please"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["disposition"], "rejected");
    assert_eq!(outcome["states"][0], "validating");
    assert_eq!(outcome["states"][1], "done");
    assert!(outcome.get("provenance").is_none());
}

#[test]
fn test_ask_requires_a_question() {
    let dir = TempDir::new().unwrap();

    tutorloop_cmd(&dir)
        .arg("ask")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}
