use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::PublishError;

/// Everything a publishing run needs, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Directory scanned for source documents.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub identifier_split: IdentifierRule,
    /// Upper bound for any single external process, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Name of the environment variable holding the push token.
    #[serde(default = "default_credential_env")]
    pub credential_env: String,
}

/// Target repository and commit identity.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    pub url: String,
    /// Where the working copy is cloned; removed at the end of every run.
    pub clone_dir: PathBuf,
    pub author_name: String,
    pub author_email: String,
    /// `{count}` is replaced with the number of documents published.
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    #[serde(default = "default_git_program")]
    pub git_program: String,
}

/// Layout of the site inside the working copy.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Converted posts directory, relative to the working copy root.
    pub posts_dir: PathBuf,
    /// Site index file, relative to the working copy root.
    pub index_path: PathBuf,
    /// Layout reference written into each post's frontmatter.
    pub layout: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            posts_dir: PathBuf::from("src/pages/scrittura/post"),
            index_path: PathBuf::from("src/pages/scrittura/posts.json"),
            layout: "../../../layouts/Post.astro".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverterConfig {
    pub program: String,
    pub source_format: String,
    pub target_format: String,
    pub source_extension: String,
    pub target_extension: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: "pandoc".to_string(),
            source_format: "docx".to_string(),
            target_format: "markdown".to_string(),
            source_extension: ".docx".to_string(),
            target_extension: ".md".to_string(),
        }
    }
}

/// How a document identifier is cut out of a source filename.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierRule {
    /// Everything before the first `.`; `v1.2.docx` becomes `v1`.
    #[default]
    FirstDot,
    /// Strip only the source extension; `v1.2.docx` becomes `v1.2`.
    LastExtension,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_credential_env() -> String {
    "MERCURY_TOKEN".to_string()
}

fn default_commit_message() -> String {
    "[Automated mercury commit] Updating posts".to_string()
}

fn default_git_program() -> String {
    "git".to_string()
}

impl PipelineConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Absolute-or-relative path of the posts directory inside the working copy.
    pub fn posts_dir(&self) -> PathBuf {
        self.repository.clone_dir.join(&self.site.posts_dir)
    }

    pub fn index_file(&self) -> PathBuf {
        self.repository.clone_dir.join(&self.site.index_path)
    }

    pub fn trace_loaded(&self) {
        info!(
            source_dir = %self.source_dir.display(),
            repo_url = %self.repository.url,
            clone_dir = %self.repository.clone_dir.display(),
            converter = %self.converter.program,
            timeout_secs = self.command_timeout_secs,
            "Loaded PipelineConfig"
        );
        debug!(?self, "PipelineConfig loaded (full debug)");
    }
}

impl RepositoryConfig {
    pub fn commit_message_for(&self, count: usize) -> String {
        self.commit_message.replace("{count}", &count.to_string())
    }
}

/// Push token. Only [`Credential::expose`] reveals the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Reads the token from the named environment variable.
    pub fn from_env(var: &str) -> Result<Self, PublishError> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => {
                info!(var, "Credential found in env");
                Ok(Self(value.trim().to_string()))
            }
            Ok(_) => Err(PublishError::Configuration(format!(
                "{var} environment variable is empty"
            ))),
            Err(e) => Err(PublishError::Configuration(format!(
                "{var} environment variable not set: {e}"
            ))),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
