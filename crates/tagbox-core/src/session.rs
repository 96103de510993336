//! Directory-scoped session context.
//!
//! The session replaces ambient global state with an explicit object that
//! owns the loaded directory's image list and the model handles built for
//! it. All operations run synchronously on the caller's thread; sidecar
//! writes are unguarded, so two racing writers resolve as
//! last-writer-wins.

use std::io::BufReader;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::classify::TagClassifier;
use crate::config::Config;
use crate::error::{Result, TagboxError};
use crate::sidecar;
use crate::types::{ImageRecord, TagSet};
use crate::wd::WdTagger;

/// A loaded directory of images plus the session's model handles.
pub struct Session {
    root: PathBuf,
    config: Config,
    images: Vec<ImageRecord>,
    classifier: Option<TagClassifier>,
    wd_tagger: Option<WdTagger>,
}

impl Session {
    /// Load a directory of images.
    pub fn load(root: impl Into<PathBuf>, config: Config) -> Result<Self> {
        let mut session = Self {
            root: root.into(),
            config,
            images: Vec::new(),
            classifier: None,
            wd_tagger: None,
        };
        session.reload()?;
        Ok(session)
    }

    /// Rescan the directory, replacing the image list.
    ///
    /// Existing records are discarded; tags are re-read from the sidecars.
    pub fn reload(&mut self) -> Result<()> {
        let mut images = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !self.is_supported(path) {
                continue;
            }
            let tags = sidecar::text::read_or_default(path, &self.config.library.tag_separator);
            images.push(ImageRecord {
                path: path.to_path_buf(),
                dimensions: probe_dimensions(path),
                tags,
                thumbnail: None,
            });
        }

        // Sort by path for deterministic ordering
        images.sort_by(|a, b| a.path.cmp(&b.path));
        self.images = images;
        tracing::info!("Loaded {} images from {:?}", self.images.len(), self.root);
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The loaded image records, in path order.
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// Find a record by path.
    pub fn find(&self, image_path: &Path) -> Option<&ImageRecord> {
        self.images.iter().find(|record| record.path == image_path)
    }

    /// Append free-text tags to an image, writing through to its sidecar.
    ///
    /// Duplicates and empty entries are dropped. Returns the number of
    /// tags actually added.
    pub fn add_tags(&mut self, image_path: &Path, tags: &[String]) -> Result<usize> {
        let record = self
            .images
            .iter_mut()
            .find(|record| record.path == image_path)
            .ok_or_else(|| TagboxError::ImageNotFound(image_path.to_path_buf()))?;

        let mut added = 0;
        for tag in tags {
            let tag = tag.trim();
            if !tag.is_empty() && !record.tags.iter().any(|existing| existing == tag) {
                record.tags.push(tag.to_string());
                added += 1;
            }
        }
        if added > 0 {
            sidecar::text::write(&record.path, &record.tags)?;
        }
        Ok(added)
    }

    /// Remove free-text tags from an image, writing through to its sidecar.
    ///
    /// Returns the number of tags actually removed.
    pub fn remove_tags(&mut self, image_path: &Path, tags: &[String]) -> Result<usize> {
        let record = self
            .images
            .iter_mut()
            .find(|record| record.path == image_path)
            .ok_or_else(|| TagboxError::ImageNotFound(image_path.to_path_buf()))?;

        let before = record.tags.len();
        record.tags.retain(|tag| !tags.contains(tag));
        let removed = before - record.tags.len();
        if removed > 0 {
            sidecar::text::write(&record.path, &record.tags)?;
        }
        Ok(removed)
    }

    /// Merge structured tags into an image's JSON sidecar.
    pub fn add_structured_tags(&self, image_path: &Path, additions: &TagSet) -> Result<TagSet> {
        if self.find(image_path).is_none() {
            return Err(TagboxError::ImageNotFound(image_path.to_path_buf()));
        }
        Ok(sidecar::json::merge(image_path, additions)?)
    }

    /// The session's tag classifier, connecting on first use.
    ///
    /// The handle is held for the remainder of the session; there is no
    /// hot-reload or eviction.
    pub async fn classifier(&mut self) -> Result<&TagClassifier> {
        let classifier = match self.classifier.take() {
            Some(classifier) => classifier,
            None => TagClassifier::connect(&self.config.classifier).await?,
        };
        Ok(self.classifier.insert(classifier))
    }

    /// The session's WD tagger, loading on first use.
    pub fn wd_tagger(&mut self) -> Result<&WdTagger> {
        let tagger = match self.wd_tagger.take() {
            Some(tagger) => tagger,
            None => WdTagger::load(&self.config.model_dir(), &self.config.wd_tagger)?,
        };
        Ok(self.wd_tagger.insert(tagger))
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.config
                    .library
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.to_lowercase() == ext_lower)
            })
            .unwrap_or(false)
    }
}

/// Read an image's pixel dimensions without a full decode.
///
/// EXIF orientations 5-8 rotate the raster a quarter turn, so width and
/// height are reported swapped to match what a viewer shows.
fn probe_dimensions(path: &Path) -> Option<(u32, u32)> {
    let (width, height) = image::image_dimensions(path).ok()?;
    match exif_orientation(path) {
        Some(orientation) if orientation >= 5 => Some((height, width)),
        _ => Some((width, height)),
    }
}

fn exif_orientation(path: &Path) -> Option<u32> {
    let file = std::fs::File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    match &field.value {
        exif::Value::Short(v) => v.first().map(|&x| x as u32),
        exif::Value::Long(v) => v.first().copied(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, Rgb([1, 2, 3]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_load_scans_sorted_and_reads_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        let b = write_image(dir.path(), "b.png", 8, 8);
        let a = write_image(dir.path(), "a.png", 16, 4);
        std::fs::write(dir.path().join("a.txt"), "beach\nsunset").unwrap();
        std::fs::write(dir.path().join("notes.md"), "not an image").unwrap();

        let session = Session::load(dir.path(), Config::default()).unwrap();
        let images = session.images();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].path, a);
        assert_eq!(images[1].path, b);
        assert_eq!(images[0].tags, vec!["beach", "sunset"]);
        assert_eq!(images[0].dimensions, Some((16, 4)));
        assert!(images[1].tags.is_empty());
    }

    #[test]
    fn test_add_tags_writes_through() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_image(dir.path(), "photo.png", 8, 8);

        let mut session = Session::load(dir.path(), Config::default()).unwrap();
        let added = session
            .add_tags(&image, &["beach".into(), "beach".into(), " ".into()])
            .unwrap();
        assert_eq!(added, 1);

        assert_eq!(
            std::fs::read_to_string(dir.path().join("photo.txt")).unwrap(),
            "beach"
        );
    }

    #[test]
    fn test_remove_tags_writes_through() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_image(dir.path(), "photo.png", 8, 8);
        std::fs::write(dir.path().join("photo.txt"), "beach\nsunset").unwrap();

        let mut session = Session::load(dir.path(), Config::default()).unwrap();
        let removed = session.remove_tags(&image, &["sunset".into()]).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("photo.txt")).unwrap(),
            "beach"
        );
    }

    #[test]
    fn test_unknown_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::load(dir.path(), Config::default()).unwrap();
        let err = session
            .add_tags(Path::new("/nowhere.png"), &["tag".into()])
            .unwrap_err();
        assert!(matches!(err, TagboxError::ImageNotFound(_)));
    }

    #[test]
    fn test_reload_picks_up_new_files() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "one.png", 8, 8);

        let mut session = Session::load(dir.path(), Config::default()).unwrap();
        assert_eq!(session.images().len(), 1);

        write_image(dir.path(), "two.png", 8, 8);
        session.reload().unwrap();
        assert_eq!(session.images().len(), 2);
    }

    #[test]
    fn test_add_structured_tags_merges_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_image(dir.path(), "photo.png", 8, 8);

        let session = Session::load(dir.path(), Config::default()).unwrap();
        let additions = TagSet {
            characters: vec!["alice".into()],
            ..TagSet::default()
        };
        let merged = session.add_structured_tags(&image, &additions).unwrap();
        assert_eq!(merged.characters, vec!["alice"]);
        assert!(dir.path().join("photo.json").exists());
    }
}
