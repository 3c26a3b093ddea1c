//! File filtering logic for the scanner.

use super::MediaKind;
use crate::core::prune::is_ignorable;
use std::collections::HashSet;
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "heic", "heif", "webp",
];

const RAW_EXTENSIONS: &[&str] = &[
    "cr2", "cr3", "crw", "raf", "raw", "dng", "nef", "arw", "orf", "rw2",
];

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "m4v", "wmv", "flv", "webm"];

/// Decides which files are media the organizer should touch
pub struct MediaFilter {
    extensions: HashSet<&'static str>,
}

impl MediaFilter {
    /// Filter accepting every supported image, RAW and video extension
    pub fn new() -> Self {
        Self {
            extensions: IMAGE_EXTENSIONS
                .iter()
                .chain(RAW_EXTENSIONS)
                .chain(VIDEO_EXTENSIONS)
                .copied()
                .collect(),
        }
    }

    /// Check if a file should be included.
    ///
    /// Marker files such as AppleDouble `._name.jpg` forks carry a media
    /// extension but no media, so they are left for the pruner.
    pub fn should_include(&self, path: &Path) -> bool {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if is_ignorable(name) {
                return false;
            }
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.contains(ext.to_lowercase().as_str()),
            None => false,
        }
    }

    /// Classify a path by extension
    pub fn kind(&self, path: &Path) -> Option<MediaKind> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        MediaKind::from_extension(&ext)
    }
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaKind {
    /// Detect the media family from a lowercase extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        if IMAGE_EXTENSIONS.contains(&ext) {
            Some(MediaKind::Image)
        } else if RAW_EXTENSIONS.contains(&ext) {
            Some(MediaKind::Raw)
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}
