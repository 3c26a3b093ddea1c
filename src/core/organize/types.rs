//! Types for the organize module.

use crate::core::fingerprint::Fingerprint;
use crate::core::metadata::CaptureDate;
use crate::core::scanner::MediaKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Everything known about one discovered file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub kind: Option<MediaKind>,
    pub captured: CaptureDate,
    pub fingerprint: Fingerprint,
    /// Earlier file in scan order with the same fingerprint
    pub duplicate_of: Option<PathBuf>,
}

impl MediaFileRecord {
    pub fn is_duplicate(&self) -> bool {
        self.duplicate_of.is_some()
    }
}

/// One step of the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlannedOperation {
    /// Relocate into the dated folder
    Move {
        source: PathBuf,
        target: PathBuf,
        target_dir: PathBuf,
    },
    /// Remove as an exact duplicate
    Delete { source: PathBuf, reason: String },
}

impl PlannedOperation {
    pub fn source(&self) -> &Path {
        match self {
            PlannedOperation::Move { source, .. } | PlannedOperation::Delete { source, .. } => {
                source
            }
        }
    }

    /// File name a rename would start from: the destination name for a
    /// move, the current name for a delete.
    pub fn display_name(&self) -> String {
        let path = match self {
            PlannedOperation::Move { target, .. } => target.as_path(),
            PlannedOperation::Delete { source, .. } => source.as_path(),
        };
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory a typed rename is resolved against
    pub fn rename_base_dir(&self) -> Option<&Path> {
        match self {
            PlannedOperation::Move { target_dir, .. } => Some(target_dir),
            PlannedOperation::Delete { source, .. } => source.parent(),
        }
    }
}

/// Counters shown alongside the plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStats {
    pub files_found: usize,
    pub files_processed: usize,
    pub duplicates_found: usize,
    pub moves: usize,
    pub deletes: usize,
    /// Files already sitting at their destination
    pub already_organized: usize,
    pub images: usize,
    pub raw_images: usize,
    pub videos: usize,
    pub total_size_bytes: u64,
}

/// The ordered operations computed from one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub root: PathBuf,
    pub operations: Vec<PlannedOperation>,
    /// Directories seen by the scan that produced this plan
    pub visited_dirs: BTreeSet<PathBuf>,
    pub stats: PlanStats,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlannedOperation> {
        self.operations.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_display_name_is_destination_name() {
        let op = PlannedOperation::Move {
            source: PathBuf::from("/r/in/photo.jpg"),
            target: PathBuf::from("/r/2023/2023-06-01/photo-1.jpg"),
            target_dir: PathBuf::from("/r/2023/2023-06-01"),
        };
        assert_eq!(op.display_name(), "photo-1.jpg");
        assert_eq!(op.rename_base_dir(), Some(Path::new("/r/2023/2023-06-01")));
    }

    #[test]
    fn delete_display_name_is_source_name() {
        let op = PlannedOperation::Delete {
            source: PathBuf::from("/r/in/copy.jpg"),
            reason: "duplicate of /r/in/photo.jpg".to_string(),
        };
        assert_eq!(op.display_name(), "copy.jpg");
        assert_eq!(op.rename_base_dir(), Some(Path::new("/r/in")));
        assert_eq!(op.source(), Path::new("/r/in/copy.jpg"));
    }
}
