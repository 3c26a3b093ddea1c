//! Directory walking implementation using walkdir.

use super::{filter::MediaFilter, ScanResult};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use regex::Regex;
use std::io;
use std::path::{Component, Path};
use std::sync::LazyLock;
use tracing::{debug, info};
use walkdir::WalkDir;

static YEAR_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("year pattern is valid"));
static DAY_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("day pattern is valid"));

/// True when `path` is `<root>/<YYYY>/<YYYY-MM-DD>` or deeper.
///
/// Only the first two segments below the root are inspected.
pub fn is_organized_path(root: &Path, path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };

    let mut segments = relative.components().filter_map(|c| match c {
        Component::Normal(s) => s.to_str(),
        _ => None,
    });

    match (segments.next(), segments.next()) {
        (Some(year), Some(day)) => YEAR_SEGMENT.is_match(year) && DAY_SEGMENT.is_match(day),
        _ => false,
    }
}

/// Depth-first scanner for the organize root
pub struct DirScanner {
    filter: MediaFilter,
}

impl DirScanner {
    /// Create a scanner with the default media filter
    pub fn new() -> Self {
        Self {
            filter: MediaFilter::new(),
        }
    }

    /// Walk `root` without progress reporting
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, &null_sender())
    }

    /// Walk `root`, reporting every directory and file found.
    ///
    /// Any unreadable entry aborts the scan.
    pub fn scan_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        if !root.exists() {
            return Err(ScanError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut result = ScanResult::default();
        let mut walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry_result) = walker.next() {
            let entry = entry_result.map_err(walk_error)?;
            let path = entry.path();

            if entry.file_type().is_dir() {
                result.visited_dirs.insert(path.to_path_buf());

                if entry.depth() > 0 && is_organized_path(root, path) {
                    debug!(path = %path.display(), "skipping organized subtree");
                    events.send(Event::Scan(ScanEvent::SubtreeSkipped {
                        path: path.to_path_buf(),
                    }));
                    walker.skip_current_dir();
                    continue;
                }

                events.send(Event::Scan(ScanEvent::DirectoryVisited {
                    path: path.to_path_buf(),
                }));
                continue;
            }

            if !entry.file_type().is_file() || !self.filter.should_include(path) {
                continue;
            }

            events.send(Event::Scan(ScanEvent::FileFound {
                path: path.to_path_buf(),
            }));
            result.files.push(path.to_path_buf());
        }

        info!(
            root = %root.display(),
            files = result.files.len(),
            directories = result.visited_dirs.len(),
            "scan complete"
        );
        events.send(Event::Scan(ScanEvent::Completed {
            total_files: result.files.len(),
            total_directories: result.visited_dirs.len(),
        }));

        Ok(result)
    }
}

/// Only a denied root is a startup failure; anything deeper aborts the run
fn walk_error(err: walkdir::Error) -> ScanError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    let denied = err.io_error().map(|io| io.kind()) == Some(io::ErrorKind::PermissionDenied);
    if denied && err.depth() == 0 {
        ScanError::PermissionDenied { path }
    } else {
        ScanError::ReadDirectory {
            path,
            source: err.into(),
        }
    }
}

impl Default for DirScanner {
    fn default() -> Self {
        Self::new()
    }
}
