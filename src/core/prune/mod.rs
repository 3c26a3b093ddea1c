//! # Prune Module
//!
//! Best-effort removal of directories left empty after a run.
//!
//! A directory is "effectively empty" when, after deleting marker files
//! such as `.DS_Store` or AppleDouble `._*` forks anywhere beneath it,
//! nothing is left in it. The organize root itself is never removed.
//!
//! Nothing in here returns an error: a directory that cannot be inspected
//! or removed is simply kept.

use crate::events::{null_sender, Event, EventSender, PruneEvent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Well-known marker files that do not count as content
pub const IGNORABLE_NAMES: &[&str] = &[
    ".DS_Store",
    ".localized",
    "Thumbs.db",
    "ehthumbs.db",
    "desktop.ini",
    "Desktop.ini",
    ".picasa.ini",
    "Icon\r",
];

/// AppleDouble resource fork prefix
pub const RESOURCE_FORK_PREFIX: &str = "._";

pub fn is_ignorable(name: &str) -> bool {
    IGNORABLE_NAMES.contains(&name) || name.starts_with(RESOURCE_FORK_PREFIX)
}

/// Directories removed during one cleanup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PruneReport {
    pub removed: Vec<PathBuf>,
}

/// Removes effectively-empty directories below a root
pub struct DirectoryPruner {
    root: PathBuf,
}

impl DirectoryPruner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Run both cleanup phases without progress reporting
    pub fn prune<I>(&self, candidates: I) -> PruneReport
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.prune_with_events(candidates, &null_sender())
    }

    /// Phase 1 climbs from each candidate towards the root, stopping at the
    /// first directory that has to stay. Phase 2 sweeps every directory
    /// under the root, deepest first.
    pub fn prune_with_events<I>(&self, candidates: I, events: &EventSender) -> PruneReport
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut report = PruneReport::default();

        let mut candidates: Vec<PathBuf> = candidates.into_iter().collect();
        sort_deepest_first(&mut candidates);
        candidates.dedup();

        for candidate in candidates {
            let mut current = candidate;
            while self.try_prune(&current, &mut report, events) {
                match current.parent() {
                    Some(parent) => current = parent.to_path_buf(),
                    None => break,
                }
            }
        }

        let mut all_dirs: Vec<PathBuf> = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();
        sort_deepest_first(&mut all_dirs);

        for dir in all_dirs {
            self.try_prune(&dir, &mut report, events);
        }

        info!(removed = report.removed.len(), "cleanup complete");
        events.send(Event::Prune(PruneEvent::Completed {
            removed: report.removed.len(),
        }));
        report
    }

    /// Clear marker files under `dir` and remove it if nothing is left.
    fn try_prune(&self, dir: &Path, report: &mut PruneReport, events: &EventSender) -> bool {
        if dir == self.root || !dir.starts_with(&self.root) {
            return false;
        }

        match remove_if_effectively_empty(dir) {
            Ok(true) => {
                debug!(path = %dir.display(), "removed empty directory");
                events.send(Event::Prune(PruneEvent::Removed {
                    path: dir.to_path_buf(),
                }));
                report.removed.push(dir.to_path_buf());
                true
            }
            Ok(false) => false,
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "skipping directory");
                false
            }
        }
    }
}

fn remove_if_effectively_empty(dir: &Path) -> io::Result<bool> {
    if !fs::symlink_metadata(dir)?.is_dir() {
        return Ok(false);
    }
    remove_ignorable_files(dir)?;

    if fs::read_dir(dir)?.next().is_some() {
        return Ok(false);
    }
    fs::remove_dir_all(dir)?;
    Ok(true)
}

fn remove_ignorable_files(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            remove_ignorable_files(&entry.path())?;
        } else if entry.file_name().to_str().is_some_and(is_ignorable) {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

fn sort_deepest_first(dirs: &mut [PathBuf]) {
    dirs.sort_by(|a, b| {
        b.components()
            .count()
            .cmp(&a.components().count())
            .then_with(|| a.cmp(b))
    });
}
