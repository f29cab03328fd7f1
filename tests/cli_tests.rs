use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary pointed at an empty working directory and an unreachable backend.
fn safetyos(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("safetyos").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("SAFETYOS_API__BASE_URL", "http://127.0.0.1:9")
        .env("SAFETYOS_SESSION__PATH", dir.path().join("session.json"));
    cmd
}

#[test]
fn help_lists_every_area() {
    let dir = TempDir::new().unwrap();
    safetyos(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("permit"))
        .stdout(predicate::str::contains("confined"))
        .stdout(predicate::str::contains("bbs"))
        .stdout(predicate::str::contains("cert"))
        .stdout(predicate::str::contains("incident"))
        .stdout(predicate::str::contains("equipment"))
        .stdout(predicate::str::contains("course"));
}

#[test]
fn permit_help_shows_the_approval_commands() {
    let dir = TempDir::new().unwrap();
    safetyos(&dir)
        .args(["permit", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("approve"))
        .stdout(predicate::str::contains("reject"))
        .stdout(predicate::str::contains("submit"));
}

#[test]
fn whoami_without_a_session_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    safetyos(&dir)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn approving_requires_a_login_before_any_request() {
    let dir = TempDir::new().unwrap();
    safetyos(&dir)
        .args(["permit", "approve", "p-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn submit_without_attachment_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    safetyos(&dir)
        .args(["permit", "submit", "--title", "Weld", "--type", "hot-work", "--location", "Unit 3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--attach"));
}
