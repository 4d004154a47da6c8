//! The site index: an ordered JSON array of `{title, date}` records.
//!
//! Every upsert is a full read-modify-write against the file on disk, so each
//! document observes the state left by the previous one.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::discover::DocumentId;
use crate::error::{io_err, PublishError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub title: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteIndex {
    pub entries: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// Existing entry's date replaced in place; `position` is its index.
    Updated { position: usize },
}

impl SiteIndex {
    pub fn load(path: &Path) -> Result<Self, PublishError> {
        let bytes = fs::read(path).map_err(|e| io_err(path, e))?;
        serde_json::from_slice(&bytes).map_err(|source| PublishError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replaces the file atomically via a sibling temp file, keeping the
    /// permissions of the file it replaces.
    pub fn save(&self, path: &Path) -> Result<(), PublishError> {
        let json = serde_json::to_vec(self).map_err(|source| PublishError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_err(dir, e))?;
        tmp.write_all(&json).map_err(|e| io_err(tmp.path(), e))?;
        if let Ok(existing) = fs::metadata(path) {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| io_err(tmp.path(), e))?;
        }
        tmp.persist(path).map_err(|e| io_err(path, e.error))?;
        Ok(())
    }

    pub fn find(&self, title: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|entry| entry.title == title)
    }

    /// Sets `date` for `title`, appending a new entry if the title is unknown.
    ///
    /// Later entries repeating `title` are dropped so exactly one remains.
    pub fn upsert(&mut self, title: &str, date: &str) -> UpsertOutcome {
        match self.entries.iter().position(|entry| entry.title == title) {
            Some(position) => {
                self.entries[position].date = date.to_string();
                let before = self.entries.len();
                let mut seen = 0;
                self.entries.retain(|entry| {
                    if entry.title != title {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
                if self.entries.len() < before {
                    warn!(
                        title,
                        removed = before - self.entries.len(),
                        "[INDEX] Dropped duplicate index entries"
                    );
                }
                UpsertOutcome::Updated { position }
            }
            None => {
                self.entries.push(IndexEntry {
                    title: title.to_string(),
                    date: date.to_string(),
                });
                UpsertOutcome::Inserted
            }
        }
    }
}

/// Loads the index at `path`, upserts `id` with `date`, and writes it back.
pub fn upsert(path: &Path, id: &DocumentId, date: &str) -> Result<UpsertOutcome, PublishError> {
    let mut index = SiteIndex::load(path)?;
    debug!(path = %path.display(), entries = index.entries.len(), "Loaded site index");

    let outcome = index.upsert(id.as_str(), date);
    index.save(path)?;

    info!(
        path = %path.display(),
        id = %id,
        date,
        ?outcome,
        entries = index.entries.len(),
        "[INDEX] Site index updated"
    );
    Ok(outcome)
}
