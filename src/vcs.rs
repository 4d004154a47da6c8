//! Boundary to the version-control tool.
//!
//! [`RepositorySync`](crate::repository::RepositorySync) decides *what* to run;
//! a [`VersionControl`] implementation decides *how*. [`GitCli`] shells out to
//! `git`, tests use `MockVersionControl`.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tokio::process::Command;
use tracing::debug;

use crate::command::{run_command, CommandOutcome};
use crate::error::VcsStep;

/// One version-control invocation.
#[derive(Clone, PartialEq, Eq)]
pub enum VcsCommand {
    Clone { url: String, destination: PathBuf },
    ConfigUserName(String),
    ConfigUserEmail(String),
    AddAll,
    Commit { message: String },
    /// Holds the credential-bearing URL; redacted from `Debug`.
    SetRemoteUrl { url: String },
    Push,
}

impl VcsCommand {
    pub fn step(&self) -> VcsStep {
        match self {
            VcsCommand::Clone { .. } => VcsStep::Clone,
            VcsCommand::ConfigUserName(_) | VcsCommand::ConfigUserEmail(_) => VcsStep::Config,
            VcsCommand::AddAll => VcsStep::Add,
            VcsCommand::Commit { .. } => VcsStep::Commit,
            VcsCommand::SetRemoteUrl { .. } => VcsStep::SetRemote,
            VcsCommand::Push => VcsStep::Push,
        }
    }

    /// Arguments after the program name.
    pub fn args(&self) -> Vec<OsString> {
        match self {
            VcsCommand::Clone { url, destination } => {
                vec!["clone".into(), url.into(), destination.into()]
            }
            VcsCommand::ConfigUserName(name) => {
                vec!["config".into(), "--global".into(), "user.name".into(), name.into()]
            }
            VcsCommand::ConfigUserEmail(email) => {
                vec!["config".into(), "--global".into(), "user.email".into(), email.into()]
            }
            VcsCommand::AddAll => vec!["add".into(), ".".into()],
            VcsCommand::Commit { message } => vec!["commit".into(), "-m".into(), message.into()],
            VcsCommand::SetRemoteUrl { url } => {
                vec!["remote".into(), "set-url".into(), "origin".into(), url.into()]
            }
            VcsCommand::Push => vec!["push".into()],
        }
    }
}

impl fmt::Debug for VcsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsCommand::Clone { url, destination } => f
                .debug_struct("Clone")
                .field("url", url)
                .field("destination", destination)
                .finish(),
            VcsCommand::ConfigUserName(name) => {
                f.debug_tuple("ConfigUserName").field(name).finish()
            }
            VcsCommand::ConfigUserEmail(email) => {
                f.debug_tuple("ConfigUserEmail").field(email).finish()
            }
            VcsCommand::AddAll => f.write_str("AddAll"),
            VcsCommand::Commit { message } => {
                f.debug_struct("Commit").field("message", message).finish()
            }
            VcsCommand::SetRemoteUrl { .. } => f
                .debug_struct("SetRemoteUrl")
                .field("url", &"<redacted>")
                .finish(),
            VcsCommand::Push => f.write_str("Push"),
        }
    }
}

/// Executes version-control commands in a working directory.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Runs `command` with `workdir` as the current directory.
    async fn run(&self, workdir: &Path, command: VcsCommand) -> CommandOutcome;
}

/// Runs commands through the `git` executable.
pub struct GitCli {
    program: String,
    timeout: Duration,
}

impl GitCli {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn run(&self, workdir: &Path, command: VcsCommand) -> CommandOutcome {
        debug!(workdir = %workdir.display(), ?command, "Running git");
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(workdir).args(command.args());
        run_command(cmd, self.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_tagged_per_command() {
        assert_eq!(VcsCommand::AddAll.step(), VcsStep::Add);
        assert_eq!(VcsCommand::ConfigUserEmail("e".into()).step(), VcsStep::Config);
        assert_eq!(VcsCommand::Push.step(), VcsStep::Push);
        assert_eq!(
            VcsCommand::SetRemoteUrl { url: "u".into() }.step(),
            VcsStep::SetRemote
        );
    }

    #[test]
    fn arguments_match_git_subcommands() {
        let args = VcsCommand::Commit {
            message: "Updating posts".into(),
        }
        .args();
        assert_eq!(args, vec![OsString::from("commit"), "-m".into(), "Updating posts".into()]);

        let args = VcsCommand::ConfigUserName("Paolo".into()).args();
        assert_eq!(
            args,
            vec![OsString::from("config"), "--global".into(), "user.name".into(), "Paolo".into()]
        );
    }

    #[test]
    fn debug_output_redacts_authenticated_url() {
        let cmd = VcsCommand::SetRemoteUrl {
            url: "https://ghp_secret@github.com/o/r".into(),
        };
        let shown = format!("{cmd:?}");
        assert!(!shown.contains("ghp_secret"));
        assert!(shown.contains("redacted"));
    }
}
