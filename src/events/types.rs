//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while planning, applying, and cleaning up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory walk events
    Scan(ScanEvent),
    /// Record collection and plan construction events
    Plan(PlanEvent),
    /// Filesystem mutation events
    Execute(ExecuteEvent),
    /// Empty-directory cleanup events
    Prune(PruneEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the directory walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Walk has started at the given root
    Started { root: PathBuf },
    /// A directory was entered
    DirectoryVisited { path: PathBuf },
    /// A supported media file was found
    FileFound { path: PathBuf },
    /// An organized subtree was recorded but not descended into
    SubtreeSkipped { path: PathBuf },
    /// Walk completed
    Completed {
        total_files: usize,
        total_directories: usize,
    },
}

/// Events while reading files and building the plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlanEvent {
    /// Counters after each processed file
    Progress(PlanProgress),
    /// Plan is ready for review
    Completed {
        operations: usize,
        duplicates: usize,
    },
}

/// Status counters exposed to the rendering layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanProgress {
    /// Media files discovered by the scan
    pub files_found: usize,
    /// Files read, dated, and fingerprinted so far
    pub files_processed: usize,
    /// Files whose content matched an earlier file
    pub duplicates_found: usize,
}

/// Events while applying the plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecuteEvent {
    /// Execution started
    Started { total: usize },
    /// One operation was applied (or skipped because of an ignore override)
    Applied {
        index: usize,
        total: usize,
        action: AppliedAction,
        path: PathBuf,
    },
    /// Every operation was applied
    Completed { applied: usize, skipped: usize },
}

/// What the executor actually did for one plan index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppliedAction {
    Moved,
    Renamed,
    Deleted,
    Skipped,
}

/// Events during empty-directory cleanup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PruneEvent {
    /// A directory was removed
    Removed { path: PathBuf },
    /// Cleanup finished
    Completed { removed: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Run finished
    Completed { summary: RunSummary },
    /// Run aborted with a fatal error
    Error { message: String },
}

/// Phases of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Planning,
    Executing,
    Pruning,
}

/// Summary of an applied run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub moved: usize,
    pub renamed: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub directories_removed: usize,
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Planning => write!(f, "Planning"),
            PipelinePhase::Executing => write!(f, "Executing"),
            PipelinePhase::Pruning => write!(f, "Cleaning up"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Plan(PlanEvent::Progress(PlanProgress {
            files_found: 10,
            files_processed: 4,
            duplicates_found: 1,
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Plan(PlanEvent::Progress(p)) => {
                assert_eq!(p.files_processed, 4);
                assert_eq!(p.duplicates_found, 1);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn run_summary_is_serializable() {
        let summary = RunSummary {
            moved: 120,
            deleted: 7,
            directories_removed: 3,
            ..Default::default()
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"moved\":120"));
        assert!(json.contains("\"directories_removed\":3"));
    }

    #[test]
    fn phase_display_is_human_readable() {
        assert_eq!(PipelinePhase::Pruning.to_string(), "Cleaning up");
    }
}
