//! Document conversion through an external converter (pandoc by default).

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tokio::process::Command;
use tracing::{error, info};

use crate::command::{run_command, CommandOutcome};
use crate::config::ConverterConfig;
use crate::discover::DocumentId;
use crate::error::{io_err, PublishError};

/// Turns one source document into one markup file.
///
/// Implemented by [`PandocConverter`] and by mocks in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Converter: Send + Sync {
    /// Converts `source_dir/<id><source ext>` into `output_dir/<id><target ext>`
    /// and returns the path of the written file.
    async fn convert(
        &self,
        id: &DocumentId,
        source_dir: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, PublishError>;
}

/// Runs `<program> -f <from> -t <to> <input> -o <output>`.
pub struct PandocConverter {
    config: ConverterConfig,
    timeout: Duration,
}

impl PandocConverter {
    pub fn new(config: ConverterConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    pub fn input_path(&self, id: &DocumentId, source_dir: &Path) -> PathBuf {
        source_dir.join(format!("{}{}", id, self.config.source_extension))
    }

    pub fn output_path(&self, id: &DocumentId, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}{}", id, self.config.target_extension))
    }
}

#[async_trait]
impl Converter for PandocConverter {
    async fn convert(
        &self,
        id: &DocumentId,
        source_dir: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, PublishError> {
        let input = self.input_path(id, source_dir);
        let output = self.output_path(id, output_dir);

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| io_err(output_dir, e))?;

        let mut cmd = Command::new(&self.config.program);
        cmd.arg("-f")
            .arg(&self.config.source_format)
            .arg("-t")
            .arg(&self.config.target_format)
            .arg(&input)
            .arg("-o")
            .arg(&output);

        match run_command(cmd, self.timeout).await {
            CommandOutcome::Success => {
                info!(
                    id = %id,
                    input = %input.display(),
                    output = %output.display(),
                    "[CONVERT] Converted document"
                );
                Ok(output)
            }
            CommandOutcome::TimedOut { after } => {
                error!(id = %id, ?after, "[CONVERT] Converter timed out");
                Err(PublishError::Timeout {
                    operation: format!("{} conversion of '{}'", self.config.program, id),
                    after,
                })
            }
            failure => {
                let reason = failure.describe();
                error!(id = %id, input = %input.display(), %reason, "[CONVERT] Converter failed");
                Err(PublishError::Conversion {
                    document: id.to_string(),
                    reason,
                })
            }
        }
    }
}
