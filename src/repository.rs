//! Working-copy lifecycle for the target repository.
//!
//! One run moves through `Absent → Cloned → Synced → Absent`:
//!
//! 1. [`RepositorySync::ensure_clean`] removes a working copy left by a crashed run.
//! 2. [`RepositorySync::clone_repository`] clones and hands out a [`WorkingCopy`].
//! 3. [`RepositorySync::commit_and_push`] configures identity, stages, commits,
//!    points `origin` at the credential-bearing URL, and pushes. The first failing
//!    step aborts the rest and is named in the error.
//! 4. [`WorkingCopy::cleanup`] removes the directory. A working copy that is
//!    dropped without cleanup removes itself.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use url::Url;

use crate::command::CommandOutcome;
use crate::config::{Credential, RepositoryConfig};
use crate::error::{io_err, PublishError};
use crate::vcs::{VcsCommand, VersionControl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Cloned,
    Synced,
}

/// A cloned repository directory owned by the current run.
#[derive(Debug)]
pub struct WorkingCopy {
    path: PathBuf,
    state: SyncState,
    released: bool,
}

impl WorkingCopy {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Recursively removes the working copy.
    pub fn cleanup(mut self) -> Result<(), PublishError> {
        self.released = true;
        remove_dir_if_present(&self.path)?;
        info!(path = %self.path.display(), "[REPO] Working copy removed");
        Ok(())
    }
}

impl Drop for WorkingCopy {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        warn!(path = %self.path.display(), "[REPO] Working copy dropped without cleanup; removing");
        if let Err(e) = remove_dir_if_present(&self.path) {
            error!(error = %e, "[REPO] Failed to remove abandoned working copy");
        }
    }
}

fn remove_dir_if_present(path: &Path) -> Result<(), PublishError> {
    if !path.exists() {
        return Ok(());
    }
    fs::remove_dir_all(path).map_err(|e| io_err(path, e))
}

/// Builds `https://<credential>@host/path` from the configured remote.
pub fn authenticated_url(remote: &str, credential: &Credential) -> Result<String, PublishError> {
    let mut url = Url::parse(remote).map_err(|e| {
        PublishError::Configuration(format!("repository url '{remote}' is not a valid URL: {e}"))
    })?;
    if url.scheme() != "https" {
        return Err(PublishError::Configuration(format!(
            "repository url must use https to carry a token, got '{}'",
            url.scheme()
        )));
    }
    url.set_password(None)
        .and_then(|_| url.set_username(credential.expose()))
        .map_err(|_| {
            PublishError::Configuration(format!(
                "repository url '{remote}' cannot carry credentials"
            ))
        })?;
    Ok(url.to_string())
}

/// Drives the version-control tool against one configured repository.
pub struct RepositorySync<'a, V: ?Sized> {
    vcs: &'a V,
    config: &'a RepositoryConfig,
}

impl<'a, V> RepositorySync<'a, V>
where
    V: VersionControl + ?Sized,
{
    pub fn new(vcs: &'a V, config: &'a RepositoryConfig) -> Self {
        Self { vcs, config }
    }

    pub fn clone_dir(&self) -> &Path {
        &self.config.clone_dir
    }

    /// Removes a stale working copy. Failing to do so is fatal.
    pub fn ensure_clean(&self) -> Result<(), PublishError> {
        let path = self.clone_dir();
        if path.exists() {
            warn!(path = %path.display(), "[REPO] Stale working copy found; removing before clone");
            remove_dir_if_present(path).map_err(|e| {
                error!(error = %e, "[REPO] Failed to remove stale working copy");
                e
            })?;
        } else {
            debug!(path = %path.display(), "[REPO] No stale working copy");
        }
        Ok(())
    }

    pub async fn clone_repository(&self) -> Result<WorkingCopy, PublishError> {
        let path = self.clone_dir().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        let command = VcsCommand::Clone {
            url: self.config.url.clone(),
            destination: path.clone(),
        };
        if let Err(e) = self.run_step(Path::new("."), command, None).await {
            // git normally cleans up after itself; do not rely on it.
            if let Err(cleanup_err) = remove_dir_if_present(&path) {
                warn!(error = %cleanup_err, "[REPO] Could not remove partial clone");
            }
            return Err(e);
        }

        info!(repo_url = %self.config.url, path = %path.display(), "[REPO] Repository cloned");
        Ok(WorkingCopy {
            path,
            state: SyncState::Cloned,
            released: false,
        })
    }

    /// Commits everything in the working copy and pushes it with `credential`.
    pub async fn commit_and_push(
        &self,
        working_copy: &mut WorkingCopy,
        credential: &Credential,
        message: &str,
    ) -> Result<(), PublishError> {
        let dir = working_copy.path().to_path_buf();

        let local_steps = [
            VcsCommand::ConfigUserName(self.config.author_name.clone()),
            VcsCommand::ConfigUserEmail(self.config.author_email.clone()),
            VcsCommand::AddAll,
            VcsCommand::Commit {
                message: message.to_string(),
            },
        ];
        for command in local_steps {
            self.run_step(&dir, command, Some(credential)).await?;
        }
        info!(message, "[REPO] Changes committed");

        let url = authenticated_url(&self.config.url, credential)?;
        self.run_step(&dir, VcsCommand::SetRemoteUrl { url }, Some(credential))
            .await?;
        self.run_step(&dir, VcsCommand::Push, Some(credential))
            .await?;

        working_copy.state = SyncState::Synced;
        info!(repo_url = %self.config.url, "[REPO] Changes pushed");
        Ok(())
    }

    pub fn cleanup(&self, working_copy: WorkingCopy) -> Result<(), PublishError> {
        working_copy.cleanup()
    }

    async fn run_step(
        &self,
        workdir: &Path,
        command: VcsCommand,
        credential: Option<&Credential>,
    ) -> Result<(), PublishError> {
        let step = command.step();
        debug!(%step, workdir = %workdir.display(), "[REPO] Running git step");
        match self.vcs.run(workdir, command).await {
            CommandOutcome::Success => Ok(()),
            CommandOutcome::TimedOut { after } => {
                error!(%step, ?after, "[REPO] git step timed out");
                Err(PublishError::Timeout {
                    operation: format!("git {step}"),
                    after,
                })
            }
            failure => {
                let mut reason = failure.describe();
                if let Some(secret) = credential.map(Credential::expose).filter(|s| !s.is_empty()) {
                    reason = reason.replace(secret, "<redacted>");
                }
                error!(%step, %reason, "[REPO] git step failed");
                Err(PublishError::Vcs { step, reason })
            }
        }
    }
}
