//! Structured tag set persistence (`<stem>.json`).

use std::path::Path;

use crate::error::SidecarError;
use crate::types::TagSet;

use super::json_path;

/// Read the structured tag set for an image.
///
/// A missing sidecar is a normal state and yields the empty set. I/O
/// failures and malformed JSON are reported to the caller.
pub fn read(image_path: &Path) -> Result<TagSet, SidecarError> {
    let path = json_path(image_path);
    if !path.exists() {
        return Ok(TagSet::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|source| SidecarError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| SidecarError::Malformed {
        path,
        message: e.to_string(),
    })
}

/// Read the structured tag set, substituting the empty set on failure.
///
/// A broken sidecar never takes the session down; the error is logged and
/// the image is treated as untagged.
pub fn read_or_default(image_path: &Path) -> TagSet {
    match read(image_path) {
        Ok(set) => set,
        Err(e) => {
            tracing::warn!("{e}");
            TagSet::default()
        }
    }
}

/// Write the structured tag set for an image.
///
/// Each category list is deduplicated and sorted before serialization so
/// repeated writes are byte-stable. Output is pretty-printed UTF-8 with
/// non-ASCII characters preserved literally.
pub fn write(image_path: &Path, tags: &TagSet) -> Result<(), SidecarError> {
    let path = json_path(image_path);
    let normalized = tags.clone().normalized();
    let content =
        serde_json::to_string_pretty(&normalized).map_err(|e| SidecarError::Malformed {
            path: path.clone(),
            message: e.to_string(),
        })?;
    std::fs::write(&path, content).map_err(|source| SidecarError::Write { path, source })
}

/// Merge additional tags into an image's sidecar and return the result.
///
/// Read-merge-write with no locking: concurrent writers race and the last
/// one wins.
pub fn merge(image_path: &Path, additions: &TagSet) -> Result<TagSet, SidecarError> {
    let mut set = read(image_path)?;
    set.merge(additions.clone());
    set.normalize();
    write(image_path, &set)?;
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StructuredTag;

    fn image_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
        dir.path().join("photo.png")
    }

    #[test]
    fn test_roundtrip_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let image = image_path(&dir);

        let set = TagSet {
            characters: vec!["b".into(), "a".into(), "a".into()],
            settings: vec![],
            actions: vec!["run".into()],
        };
        write(&image, &set).unwrap();

        let read_back = read(&image).unwrap();
        assert_eq!(read_back.characters, vec!["a", "b"]);
        assert!(read_back.settings.is_empty());
        assert_eq!(read_back.actions, vec!["run"]);
    }

    #[test]
    fn test_missing_sidecar_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let set = read(&image_path(&dir)).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_malformed_sidecar_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = image_path(&dir);
        std::fs::write(json_path(&image), "{not json").unwrap();

        let err = read(&image).unwrap_err();
        assert!(matches!(err, SidecarError::Malformed { .. }));
        // The tolerant wrapper substitutes the empty set.
        assert!(read_or_default(&image).is_empty());
    }

    #[test]
    fn test_merge_accumulates_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let image = image_path(&dir);

        let mut first = TagSet::default();
        first.insert(StructuredTag::Character("alice".into()));
        write(&image, &first).unwrap();

        let mut additions = TagSet::default();
        additions.insert(StructuredTag::Character("alice".into()));
        additions.insert(StructuredTag::Character("bob".into()));
        additions.insert(StructuredTag::Action("running".into()));
        let merged = merge(&image, &additions).unwrap();

        assert_eq!(merged.characters, vec!["alice", "bob"]);
        assert_eq!(merged.actions, vec!["running"]);
        assert_eq!(read(&image).unwrap(), merged);
    }

    #[test]
    fn test_non_ascii_preserved_literally() {
        let dir = tempfile::tempdir().unwrap();
        let image = image_path(&dir);

        let set = TagSet {
            characters: vec!["café 猫".into()],
            ..TagSet::default()
        };
        write(&image, &set).unwrap();

        let raw = std::fs::read_to_string(json_path(&image)).unwrap();
        assert!(raw.contains("café 猫"), "expected literal UTF-8, got {raw}");
        assert!(raw.contains("  \"characters\""), "expected 2-space indent");
    }
}
