//! CLI tests for the `tp` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Temp dir holding a config that points the store inside it
struct CliEnv {
    dir: TempDir,
}

impl CliEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = format!(
            "log-level: debug\nllm:\n  api-key-env: TP_TEST_MISSING_LLM_KEY\ntravel:\n  enabled: false\nstorage:\n  store-dir: {}\nauth:\n  credentials:\n    tok-alice: alice\n",
            dir.path().join("store").display()
        );
        std::fs::write(dir.path().join("tripplanner.yml"), config).unwrap();
        Self { dir }
    }

    fn tp(&self) -> Command {
        let mut cmd = Command::cargo_bin("tp").unwrap();
        cmd.arg("--config")
            .arg(self.dir.path().join("tripplanner.yml"))
            .env("XDG_DATA_HOME", self.dir.path().join("data"))
            .env("NO_COLOR", "1")
            .env_remove("TP_TOKEN")
            .env_remove("TP_TEST_MISSING_LLM_KEY");
        cmd
    }

    fn create_paris(&self) -> String {
        let output = self
            .tp()
            .args([
                "trip",
                "create",
                "--owner",
                "alice",
                "--destination",
                "Paris",
                "--start",
                "2025-06-01",
                "--end",
                "2025-06-05",
                "--budget",
                "high",
                "--style",
                "adventure",
                "--group-size",
                "2",
            ])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        stdout.split_whitespace().last().unwrap().to_string()
    }
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("tp")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("trip"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_create_show_and_list() {
    let env = CliEnv::new();
    let id = env.create_paris();
    assert_eq!(id.len(), 36);

    env.tp()
        .args(["trip", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paris"))
        .stdout(predicate::str::contains("draft"))
        .stdout(predicate::str::contains("2025-06-01 to 2025-06-05"));

    env.tp()
        .args(["trip", "list", "--owner", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));

    env.tp()
        .args(["trip", "list", "--status", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No trips found"));
}

#[test]
fn test_create_rejects_bad_group_size() {
    let env = CliEnv::new();
    env.tp()
        .args([
            "trip",
            "create",
            "-o",
            "alice",
            "-d",
            "Paris",
            "-b",
            "low",
            "-s",
            "cultural",
            "-g",
            "51",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Group size must be between 1 and 50"));
}

#[test]
fn test_create_rejects_unknown_style() {
    let env = CliEnv::new();
    env.tp()
        .args(["trip", "create", "-o", "alice", "-d", "Paris", "-b", "low", "-s", "party"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid travel style"));
}

#[test]
fn test_show_rejects_malformed_id() {
    let env = CliEnv::new();
    env.tp()
        .args(["trip", "show", "not-a-uuid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid trip ID format"));
}

#[test]
fn test_generate_requires_llm_key() {
    let env = CliEnv::new();
    let id = env.create_paris();
    env.tp()
        .args(["generate", &id, "--token", "tok-alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TP_TEST_MISSING_LLM_KEY"));
}
