//! Free-text tag persistence (`<stem>.txt`).

use std::path::Path;

use crate::error::SidecarError;

use super::text_path;

/// Read the free-text tags for an image.
///
/// Tags may be separated by newlines or by the configured separator;
/// entries are trimmed and empties dropped. A missing sidecar yields no
/// tags.
pub fn read(image_path: &Path, separator: &str) -> Result<Vec<String>, SidecarError> {
    let path = text_path(image_path);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path).map_err(|source| SidecarError::Read {
        path: path.clone(),
        source,
    })?;
    Ok(parse(&content, separator))
}

/// Read the free-text tags, substituting no tags on failure.
pub fn read_or_default(image_path: &Path, separator: &str) -> Vec<String> {
    match read(image_path, separator) {
        Ok(tags) => tags,
        Err(e) => {
            tracing::warn!("{e}");
            Vec::new()
        }
    }
}

/// Write the free-text tags, newline-joined.
pub fn write(image_path: &Path, tags: &[String]) -> Result<(), SidecarError> {
    let path = text_path(image_path);
    std::fs::write(&path, tags.join("\n")).map_err(|source| SidecarError::Write { path, source })
}

fn parse(content: &str, separator: &str) -> Vec<String> {
    content
        .lines()
        .flat_map(|line| line.split(separator))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
