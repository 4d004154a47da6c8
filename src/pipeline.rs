//! High-level pipeline: clone → convert → frontmatter → index → commit/push → cleanup.
//!
//! [`Pipeline::run`] executes one publishing run for a loaded [`PipelineConfig`]:
//!   - Removes any stale working copy and clones the target repository
//!   - Discovers source documents and, for each one, converts it, prepends its
//!     frontmatter and upserts it into the site index, stamping it with the time
//!     its processing started (UTC, so stored dates sort in time order)
//!   - Commits and pushes the working copy; skipped when no documents were
//!     found, and the report then carries `pushed: false`
//!   - Removes the working copy on every exit path
//!
//! Any failing step aborts the run with a [`PublishError`]. Cleanup still runs; if
//! it fails too, the run's error is returned and the cleanup failure is logged.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{error, info, warn};

use crate::config::{Credential, PipelineConfig};
use crate::convert::Converter;
use crate::discover::{discover, DocumentId};
use crate::error::PublishError;
use crate::frontmatter::{format_timestamp, inject_heading};
use crate::index::{self, UpsertOutcome};
use crate::repository::{RepositorySync, WorkingCopy};
use crate::vcs::VersionControl;

/// Outcome of a successful run.
#[derive(Debug)]
pub struct PublishReport {
    pub documents: Vec<PublishedDocument>,
    /// False when there was nothing to publish and no commit was attempted.
    pub pushed: bool,
}

#[derive(Debug, Clone)]
pub struct PublishedDocument {
    pub id: DocumentId,
    pub output: PathBuf,
    pub date: String,
    pub index_outcome: UpsertOutcome,
}

pub struct Pipeline<C, V> {
    config: PipelineConfig,
    converter: C,
    vcs: V,
}

impl<C, V> Pipeline<C, V>
where
    C: Converter,
    V: VersionControl,
{
    pub fn new(config: PipelineConfig, converter: C, vcs: V) -> Self {
        Self {
            config,
            converter,
            vcs,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Documents that a run would publish right now. No side effects.
    pub fn discover(&self) -> Result<Vec<DocumentId>, PublishError> {
        discover(
            &self.config.source_dir,
            &self.config.converter.source_extension,
            self.config.identifier_split,
        )
    }

    pub async fn run(&self, credential: &Credential) -> Result<PublishReport, PublishError> {
        info!("[PUBLISH] Starting publishing run");
        let repo = RepositorySync::new(&self.vcs, &self.config.repository);

        repo.ensure_clean()?;
        let mut working_copy = repo.clone_repository().await?;

        let result = self.publish_into(&repo, &mut working_copy, credential).await;
        let cleanup = repo.cleanup(working_copy);

        match (result, cleanup) {
            (Ok(report), Ok(())) => {
                info!(
                    documents = report.documents.len(),
                    pushed = report.pushed,
                    "[PUBLISH] Run complete"
                );
                Ok(report)
            }
            (Ok(_), Err(cleanup_err)) => {
                error!(error = %cleanup_err, "[PUBLISH][ERROR] Published, but cleanup failed");
                Err(cleanup_err)
            }
            (Err(e), Ok(())) => {
                error!(error = %e, "[PUBLISH][ERROR] Run failed; working copy removed");
                Err(e)
            }
            (Err(e), Err(cleanup_err)) => {
                error!(
                    error = %e,
                    cleanup_error = %cleanup_err,
                    "[PUBLISH][ERROR] Run failed and working copy could not be removed"
                );
                Err(e)
            }
        }
    }

    async fn publish_into(
        &self,
        repo: &RepositorySync<'_, V>,
        working_copy: &mut WorkingCopy,
        credential: &Credential,
    ) -> Result<PublishReport, PublishError> {
        let ids = self.discover()?;
        if ids.is_empty() {
            warn!(
                source_dir = %self.config.source_dir.display(),
                "[PUBLISH] No documents found; nothing to commit"
            );
            return Ok(PublishReport {
                documents: Vec::new(),
                pushed: false,
            });
        }

        let posts_dir = self.config.posts_dir();
        let index_file = self.config.index_file();

        let mut documents = Vec::with_capacity(ids.len());
        for id in &ids {
            documents.push(self.publish_document(id, &posts_dir, &index_file).await?);
        }

        let message = self.config.repository.commit_message_for(documents.len());
        repo.commit_and_push(working_copy, credential, &message)
            .await?;

        Ok(PublishReport {
            documents,
            pushed: true,
        })
    }

    async fn publish_document(
        &self,
        id: &DocumentId,
        posts_dir: &Path,
        index_file: &Path,
    ) -> Result<PublishedDocument, PublishError> {
        let date = format_timestamp(&Utc::now());
        info!(id = %id, %date, "[PUBLISH] Processing document");

        let output = self
            .converter
            .convert(id, &self.config.source_dir, posts_dir)
            .await?;
        inject_heading(&output, &self.config.site.layout, id, &date)?;
        let index_outcome = index::upsert(index_file, id, &date)?;

        Ok(PublishedDocument {
            id: id.clone(),
            output,
            date,
            index_outcome,
        })
    }
}
