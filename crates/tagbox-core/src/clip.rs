//! Clipping: cropping a tagged sub-region out of an image.
//!
//! Selections arrive in the coordinate space of a scaled, possibly
//! letterboxed display. They are mapped back to original pixel
//! coordinates before the crop, and the crop is taken from the original
//! file rather than whatever was rendered.

use std::path::{Path, PathBuf};

use image::GenericImageView;

use crate::error::{ClipError, SidecarError};
use crate::sidecar;
use crate::types::TagSet;

/// An axis-aligned rectangle in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Flip negative extents so width and height are non-negative.
    pub fn normalized(self) -> Self {
        let (x, width) = if self.width < 0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Map a display-space selection into original image coordinates.
///
/// `display_rect` is the sub-rectangle of the widget actually covered by
/// the rendered image (letterboxing excluded); `original` is the image's
/// native pixel size. The selection is translated by the display origin,
/// then scaled, truncating to whole pixels.
pub fn map_to_image(selection: Rect, display_rect: Rect, original: (u32, u32)) -> Rect {
    let scale_x = original.0 as f64 / display_rect.width as f64;
    let scale_y = original.1 as f64 / display_rect.height as f64;
    Rect {
        x: ((selection.x - display_rect.x) as f64 * scale_x) as i32,
        y: ((selection.y - display_rect.y) as f64 * scale_y) as i32,
        width: (selection.width as f64 * scale_x) as i32,
        height: (selection.height as f64 * scale_y) as i32,
    }
}

/// Map a display-space selection against an image file's native size.
pub fn map_selection(
    original: &Path,
    selection: Rect,
    display_rect: Rect,
) -> Result<Rect, ClipError> {
    let dimensions = image::image_dimensions(original).map_err(|e| ClipError::Decode {
        path: original.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(map_to_image(selection, display_rect, dimensions))
}

/// Reject selections under the minimum edge length.
pub fn validate_selection(selection: Rect, min: u32) -> Result<(), ClipError> {
    let selection = selection.normalized();
    if (selection.width as u32) < min || (selection.height as u32) < min {
        return Err(ClipError::SelectionTooSmall {
            width: selection.width as u32,
            height: selection.height as u32,
            min,
        });
    }
    Ok(())
}

/// Next free clip path for an original: `<stem>_clip<N><ext>`.
///
/// N is the smallest positive integer whose path does not exist yet.
pub fn next_clip_path(original: &Path) -> PathBuf {
    let stem = original
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("clip");
    let extension = original.extension().and_then(|s| s.to_str());
    let parent = original.parent().unwrap_or_else(|| Path::new(""));

    let mut clip_number = 1u32;
    loop {
        let file_name = match extension {
            Some(ext) => format!("{stem}_clip{clip_number}.{ext}"),
            None => format!("{stem}_clip{clip_number}"),
        };
        let candidate = parent.join(file_name);
        if !candidate.exists() {
            return candidate;
        }
        clip_number += 1;
    }
}

/// A crop written to disk, pending its tag set.
#[derive(Debug)]
pub struct PendingClip {
    /// Path of the new clip file
    pub path: PathBuf,
    /// Crop width in pixels
    pub width: u32,
    /// Crop height in pixels
    pub height: u32,
}

/// Crop `image_rect` (in original pixel coordinates) out of the original
/// file and write it beside the original.
///
/// The rectangle is clamped to the image bounds before cropping.
pub fn create_clip(original: &Path, image_rect: Rect) -> Result<PendingClip, ClipError> {
    let image = image::open(original).map_err(|e| ClipError::Decode {
        path: original.to_path_buf(),
        message: e.to_string(),
    })?;
    let (image_width, image_height) = image.dimensions();

    let rect = image_rect.normalized();
    let left = rect.x.clamp(0, image_width as i32) as u32;
    let top = rect.y.clamp(0, image_height as i32) as u32;
    let right = (rect.x + rect.width).clamp(0, image_width as i32) as u32;
    let bottom = (rect.y + rect.height).clamp(0, image_height as i32) as u32;
    if right <= left || bottom <= top {
        return Err(ClipError::OutsideImage {
            path: original.to_path_buf(),
        });
    }

    let cropped = image.crop_imm(left, top, right - left, bottom - top);
    let path = next_clip_path(original);
    cropped.save(&path).map_err(|e| ClipError::Save {
        path: path.clone(),
        message: e.to_string(),
    })?;
    tracing::info!("Saved clip {:?} ({}x{})", path, right - left, bottom - top);

    Ok(PendingClip {
        path,
        width: right - left,
        height: bottom - top,
    })
}

/// Attach a tag set to a saved clip by writing its JSON sidecar.
///
/// The sidecar lands beside the clip with each category deduplicated and
/// sorted.
pub fn attach_tags(clip: &PendingClip, tags: &TagSet) -> Result<(), SidecarError> {
    sidecar::json::write(&clip.path, tags)
}

/// Remove a clip whose tag entry was cancelled.
///
/// Best-effort: a failure to delete leaves the file behind and is only
/// logged.
pub fn discard(clip: PendingClip) {
    if let Err(e) = std::fs::remove_file(&clip.path) {
        tracing::debug!("Could not remove cancelled clip {:?}: {e}", clip.path);
    }
}

/// Copy the original's sidecar files (if any) to sit beside the clip.
pub fn copy_sidecars(original: &Path, clip: &PendingClip) -> Result<(), SidecarError> {
    let text_source = sidecar::text_path(original);
    if text_source.exists() {
        let dest = sidecar::text_path(&clip.path);
        std::fs::copy(&text_source, &dest)
            .map_err(|source| SidecarError::Write { path: dest, source })?;
    }
    let json_source = sidecar::json_path(original);
    if json_source.exists() {
        let dest = sidecar::json_path(&clip.path);
        std::fs::copy(&json_source, &dest)
            .map_err(|source| SidecarError::Write { path: dest, source })?;
    }
    Ok(())
}
