// mail-probe/tests/cli_integration.rs

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Command isolated from any config files on the host.
fn mail_probe(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mail-probe").unwrap();
    cmd.current_dir(workdir)
        .env("HOME", workdir)
        .env("XDG_CONFIG_HOME", workdir.join(".config"))
        .env_remove("MP_CONFIG")
        .env_remove("MP_ENDPOINT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_missing_file_exits_with_status_1() {
    let workdir = TempDir::new().unwrap();
    mail_probe(workdir.path())
        .env("MP_ENDPOINT", "http://127.0.0.1:9/register")
        .arg("does-not-exist.txt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "[ERROR] File not found: does-not-exist.txt",
        ));

    // Nothing was reset or created.
    assert!(!workdir.path().join("valid_emails.txt").exists());
}

#[test]
fn test_missing_endpoint_is_a_config_error() {
    let workdir = TempDir::new().unwrap();
    fs::write(workdir.path().join("emails.txt"), "a@example.com\n").unwrap();

    mail_probe(workdir.path())
        .arg("emails.txt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No probe endpoint configured"));
}

#[test]
fn test_malformed_endpoint_exits_without_probing() {
    let workdir = TempDir::new().unwrap();
    fs::write(workdir.path().join("emails.txt"), "a@example.com\nb@example.com\n").unwrap();
    fs::write(
        workdir.path().join("mail-probe.toml"),
        "[probe]\nendpoint = \"https://exa mple.test:99999/register\"\n",
    )
    .unwrap();

    mail_probe(workdir.path())
        .arg("emails.txt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid endpoint"));

    assert!(!workdir.path().join("retry_emails.txt").exists());
}

#[test]
fn test_malformed_env_endpoint_is_not_used() {
    let workdir = TempDir::new().unwrap();
    fs::write(workdir.path().join("emails.txt"), "a@example.com\n").unwrap();

    mail_probe(workdir.path())
        .env("MP_ENDPOINT", "https://exa mple.test/register")
        .arg("emails.txt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No probe endpoint configured"));

    assert!(!workdir.path().join("retry_emails.txt").exists());
}

#[test]
fn test_unreadable_list_keeps_previous_output() {
    let workdir = TempDir::new().unwrap();
    fs::write(workdir.path().join("emails.txt"), [0xff, 0xfe, b'\n']).unwrap();
    fs::write(workdir.path().join("valid_emails.txt"), "kept@example.com\n").unwrap();

    mail_probe(workdir.path())
        .env("MP_ENDPOINT", "http://127.0.0.1:9/register")
        .arg("emails.txt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read list"));

    assert_eq!(
        fs::read_to_string(workdir.path().join("valid_emails.txt")).unwrap(),
        "kept@example.com\n"
    );
}

#[test]
fn test_help_shows_positional_file() {
    let workdir = TempDir::new().unwrap();
    mail_probe(workdir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[FILE]"));
}

#[test]
fn test_file_path_read_from_prompt() {
    let workdir = TempDir::new().unwrap();
    mail_probe(workdir.path())
        .env("MP_ENDPOINT", "http://127.0.0.1:9/register")
        .write_stdin("missing-list.txt\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Enter email list file:"))
        .stderr(predicate::str::contains("File not found: missing-list.txt"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_run_writes_outputs_and_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("email", "new@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Create account"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("email", "known@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Enter password"))
        .mount(&server)
        .await;

    let workdir = TempDir::new().unwrap();
    let dir = workdir.path().to_path_buf();
    fs::write(
        dir.join("emails.txt"),
        "new@example.com\n\nknown@example.com\nnot-an-email\n",
    )
    .unwrap();
    // Leftovers from an earlier run must be gone afterwards.
    fs::write(dir.join("valid_emails.txt"), "stale@example.com\n").unwrap();
    fs::write(
        dir.join("mail-probe.toml"),
        format!("[probe]\nendpoint = \"{}/register\"\n", server.uri()),
    )
    .unwrap();

    let run_dir = dir.clone();
    let output = tokio::task::spawn_blocking(move || {
        mail_probe(&run_dir).arg("emails.txt").output().unwrap()
    })
    .await
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing 3 emails"))
        .stdout(predicate::str::contains("[+] Valid: 1"))
        .stdout(predicate::str::contains("[-] Invalid: 1"))
        .stdout(predicate::str::contains("[!] Failed: 0"))
        .stdout(predicate::str::contains("[!] Skipped: 1"))
        .stdout(predicate::str::contains("Progress: 3/3 (100%)"));

    assert_eq!(
        fs::read_to_string(dir.join("valid_emails.txt")).unwrap(),
        "known@example.com\n"
    );
    assert_eq!(
        fs::read_to_string(dir.join("invalid_emails.txt")).unwrap(),
        "new@example.com\n"
    );
    assert_eq!(fs::read_to_string(dir.join("retry_emails.txt")).unwrap(), "");

    let log = fs::read_to_string(dir.join("checker.log")).unwrap();
    assert_eq!(log.lines().count(), 3);
    assert!(log.contains("[!] Skipping invalid email format: not-an-email"));
}
