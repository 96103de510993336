//! Sidecar file persistence.
//!
//! Tags live beside each image in two sidecar files sharing the image's
//! stem: free-text tags in `<stem>.txt` and the structured tag set in
//! `<stem>.json`.
//!
//! Reads and writes are synchronous and unguarded; two writers racing on
//! the same sidecar resolve as last-writer-wins.

pub mod encoding;
pub mod json;
pub mod text;

use std::path::{Path, PathBuf};

/// Path of the JSON sidecar for an image.
pub fn json_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("json")
}

/// Path of the plain-text sidecar for an image.
pub fn text_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_paths_share_the_stem() {
        let image = Path::new("/photos/beach.png");
        assert_eq!(json_path(image), Path::new("/photos/beach.json"));
        assert_eq!(text_path(image), Path::new("/photos/beach.txt"));
    }
}
