use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_describes_the_manifest_flow() {
    Command::cargo_bin("arc-setup")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("manifest flow"))
        .stdout(predicate::str::contains("--relay-url"));
}

#[test]
fn missing_host_file_is_a_clean_error() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("arc-setup")
        .unwrap()
        .current_dir(dir.path())
        .args([
            "--relay-url",
            "http://127.0.0.1:1/gamf",
            "--webhook-url",
            "http://127.0.0.1:1/webhook",
            "--host-file",
            "missing/github_host.txt",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
