//! # Scanner Module
//!
//! Discovers media files under the organize root.
//!
//! ## Supported Formats
//! - Images: jpg, jpeg, png, gif, bmp, tiff, tif, heic, heif, webp
//! - RAW: cr2, cr3, crw, raf, raw, dng, nef, arw, orf, rw2
//! - Video: mp4, mov, avi, mkv, m4v, wmv, flv, webm
//!
//! Subtrees that already follow the `<root>/YYYY/YYYY-MM-DD` layout are
//! recorded as visited but never descended into.
//!
//! ## Example
//! ```rust,ignore
//! use media_sorter::core::scanner::DirScanner;
//!
//! let scan = DirScanner::new().scan(Path::new("/Users/me/Pictures"))?;
//! println!("{} files in {} directories", scan.files.len(), scan.visited_dirs.len());
//! ```

mod filter;
mod walker;

pub use filter::MediaFilter;
pub use walker::{is_organized_path, DirScanner};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Media families recognised by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Raw,
    Video,
}

/// Result of walking the root
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Media files in depth-first, name-sorted order
    pub files: Vec<PathBuf>,
    /// Every directory encountered, including the root and skipped subtrees
    pub visited_dirs: BTreeSet<PathBuf>,
}
