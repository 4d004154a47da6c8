use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::IdentifierRule;
use crate::error::{io_err, PublishError};

/// Extension-stripped document name; keys the converted file and the index entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the identifier from a filename already known to end in `extension`.
    pub fn from_file_name(name: &str, extension: &str, rule: IdentifierRule) -> Option<Self> {
        let stem = match rule {
            IdentifierRule::FirstDot => name.split('.').next().unwrap_or(""),
            IdentifierRule::LastExtension => name.strip_suffix(extension)?,
        };
        if stem.is_empty() {
            None
        } else {
            Some(Self(stem.to_string()))
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lists the convertible documents in `dir`, in lexical order and without duplicates.
pub fn discover(
    dir: &Path,
    extension: &str,
    rule: IdentifierRule,
) -> Result<Vec<DocumentId>, PublishError> {
    info!(dir = %dir.display(), extension, ?rule, "[DISCOVER] Scanning for documents");
    let mut found = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let file_type = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            warn!(path = %entry.path().display(), "Skipping non UTF-8 filename");
            continue;
        };
        if !name.ends_with(extension) {
            continue;
        }
        match DocumentId::from_file_name(name, extension, rule) {
            Some(id) => {
                debug!(file = name, id = %id, "Found document");
                found.push(id);
            }
            None => warn!(file = name, "Filename yields an empty identifier; skipping"),
        }
    }

    found.sort();
    let before = found.len();
    found.dedup();
    if found.len() != before {
        warn!(
            collapsed = before - found.len(),
            "Several files mapped to the same identifier; keeping one of each"
        );
    }

    info!(count = found.len(), "[DISCOVER] Discovery finished");
    Ok(found)
}
