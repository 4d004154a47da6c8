use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, TimeZone};
use tracing::{debug, info};

use crate::discover::DocumentId;
use crate::error::{io_err, PublishError};

/// RFC-3339 with second precision and `Z` for UTC, the format used in posts and the index.
pub fn format_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Renders the frontmatter block placed above a converted post.
pub fn render_heading(layout: &str, id: &DocumentId, date: &str) -> String {
    format!("---\n\nlayout: {layout}\n\ntitle: \"{id}\"\n\ndate: \"{date}\"\n\n---\n\n")
}

/// Prepends the frontmatter block to the file at `path`.
///
/// Not idempotent: a second call stacks a second block. Call once per conversion.
pub fn inject_heading(
    path: &Path,
    layout: &str,
    id: &DocumentId,
    date: &str,
) -> Result<(), PublishError> {
    let body = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    debug!(path = %path.display(), body_len = body.len(), "Read converted document");

    let mut content = render_heading(layout, id, date);
    content.push_str(&body);

    fs::write(path, content).map_err(|e| io_err(path, e))?;
    info!(path = %path.display(), id = %id, date, "[FRONTMATTER] Heading injected");
    Ok(())
}
