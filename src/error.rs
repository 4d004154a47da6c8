//! Error types shared by every pipeline stage.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The version-control sub-step that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsStep {
    Clone,
    Config,
    Add,
    Commit,
    SetRemote,
    Push,
}

impl fmt::Display for VcsStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VcsStep::Clone => "clone",
            VcsStep::Config => "config",
            VcsStep::Add => "add",
            VcsStep::Commit => "commit",
            VcsStep::SetRemote => "remote set-url",
            VcsStep::Push => "push",
        };
        f.write_str(name)
    }
}

/// All errors that can abort a publishing run.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Filesystem read/write/remove failure, with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external converter could not be started or exited non-zero.
    #[error("conversion of '{document}' failed: {reason}")]
    Conversion { document: String, reason: String },

    /// The persisted site index is not a well-formed JSON array of entries.
    #[error("malformed site index at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A version-control invocation failed; `step` says which one.
    #[error("git {step} failed: {reason}")]
    Vcs { step: VcsStep, reason: String },

    /// Missing or invalid configuration, including a missing credential.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An external process did not finish within the configured bound.
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },
}

impl PublishError {
    /// The failing VCS step, if this is a version-control error.
    pub fn vcs_step(&self) -> Option<VcsStep> {
        match self {
            PublishError::Vcs { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Convenience constructor for [`PublishError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PublishError {
    PublishError::Io {
        path: path.into(),
        source,
    }
}
