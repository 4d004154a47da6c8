// Exercises GitCli against a local bare repository. Skips when git is not installed.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use mercury::command::CommandOutcome;
use mercury::config::RepositoryConfig;
use mercury::repository::{RepositorySync, SyncState};
use mercury::vcs::{GitCli, VcsCommand, VersionControl};
use mercury::VcsStep;
use tempfile::tempdir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn init_bare(path: &Path) {
    let status = Command::new("git")
        .arg("init")
        .arg("--bare")
        .arg(path)
        .status()
        .expect("git init --bare");
    assert!(status.success());
}

#[tokio::test]
async fn clones_a_local_bare_repository() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let tmp = tempdir().unwrap();
    let remote = tmp.path().join("remote.git");
    init_bare(&remote);

    let git = GitCli::new("git", Duration::from_secs(60));
    let destination = tmp.path().join("working");
    let outcome = git
        .run(
            tmp.path(),
            VcsCommand::Clone {
                url: remote.to_string_lossy().into_owned(),
                destination: destination.clone(),
            },
        )
        .await;

    assert_eq!(outcome, CommandOutcome::Success);
    assert!(destination.join(".git").is_dir());
}

#[tokio::test]
async fn missing_remote_fails_at_clone_step() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let tmp = tempdir().unwrap();
    let git = GitCli::new("git", Duration::from_secs(60));
    let config = RepositoryConfig {
        url: tmp.path().join("does-not-exist.git").to_string_lossy().into_owned(),
        clone_dir: tmp.path().join("working"),
        author_name: "Test".into(),
        author_email: "test@example.com".into(),
        commit_message: "msg".into(),
        git_program: "git".into(),
    };

    let repo = RepositorySync::new(&git, &config);
    repo.ensure_clean().unwrap();
    let err = repo.clone_repository().await.unwrap_err();

    assert_eq!(err.vcs_step(), Some(VcsStep::Clone));
    assert!(!config.clone_dir.exists());
}

#[tokio::test]
async fn clone_into_previously_stale_path_succeeds() {
    if !git_available() {
        eprintln!("git not available; skipping");
        return;
    }
    let tmp = tempdir().unwrap();
    let remote = tmp.path().join("remote.git");
    init_bare(&remote);

    let clone_dir = tmp.path().join("working");
    std::fs::create_dir_all(clone_dir.join("leftover")).unwrap();

    let git = GitCli::new("git", Duration::from_secs(60));
    let config = RepositoryConfig {
        url: remote.to_string_lossy().into_owned(),
        clone_dir: clone_dir.clone(),
        author_name: "Test".into(),
        author_email: "test@example.com".into(),
        commit_message: "msg".into(),
        git_program: "git".into(),
    };

    let repo = RepositorySync::new(&git, &config);
    repo.ensure_clean().unwrap();
    let working_copy = repo.clone_repository().await.unwrap();

    assert_eq!(working_copy.state(), SyncState::Cloned);
    assert!(clone_dir.join(".git").is_dir());
    assert!(!clone_dir.join("leftover").exists());

    repo.cleanup(working_copy).unwrap();
    assert!(!clone_dir.exists());
}
