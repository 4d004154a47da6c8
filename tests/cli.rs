use std::fs::{create_dir_all, write};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn write_config(dir: &std::path::Path, source_dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("mercury.yaml");
    let yaml = format!(
        "source_dir: {}\nrepository:\n  url: https://github.com/ornato-t/paolo-sernini\n  clone_dir: {}\n  author_name: Paolo Sernini\n  author_email: paolo@example.com\ncredential_env: MERCURY_CLI_TEST_TOKEN\n",
        source_dir.display(),
        dir.join("site").display()
    );
    write(&path, yaml).expect("Writing temp config failed");
    path
}

#[test]
fn discover_lists_documents_without_side_effects() {
    let tmp = tempdir().unwrap();
    let drafts = tmp.path().join("drafts");
    create_dir_all(&drafts).unwrap();
    write(drafts.join("post1.docx"), b"x").unwrap();
    write(drafts.join("post2.docx"), b"x").unwrap();
    write(drafts.join("notes.txt"), b"x").unwrap();
    let config = write_config(tmp.path(), &drafts);

    let mut cmd = Command::cargo_bin("mercury").expect("Binary exists");
    cmd.current_dir(tmp.path())
        .arg("discover")
        .arg("--config")
        .arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("post1").and(predicate::str::contains("post2")))
        .stdout(predicate::str::contains("notes").not());
    assert!(!tmp.path().join("site").exists());
}

#[test]
fn publish_without_credential_fails_before_touching_the_repository() {
    let tmp = tempdir().unwrap();
    let drafts = tmp.path().join("drafts");
    create_dir_all(&drafts).unwrap();
    let config = write_config(tmp.path(), &drafts);

    let mut cmd = Command::cargo_bin("mercury").expect("Binary exists");
    cmd.current_dir(tmp.path())
        .env_remove("MERCURY_CLI_TEST_TOKEN")
        .arg("publish")
        .arg("--config")
        .arg(&config);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("MERCURY_CLI_TEST_TOKEN"));
    assert!(!tmp.path().join("site").exists());
}

#[test]
fn missing_subcommand_prints_usage() {
    let mut cmd = Command::cargo_bin("mercury").expect("Binary exists");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
