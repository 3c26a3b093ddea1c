//! Pipeline execution implementation.

use crate::core::organize::{collect_records, ExecutionReport, Executor, Plan, PlanBuilder};
use crate::core::prune::{DirectoryPruner, PruneReport};
use crate::core::review::Overrides;
use crate::core::scanner::DirScanner;
use crate::error::{OrganizeError, ScanError};
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PlanEvent, RunSummary,
};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of applying a plan
#[derive(Debug, Default)]
pub struct RunReport {
    pub execution: ExecutionReport,
    pub pruned: PruneReport,
    /// True when the run was a dry run and nothing was touched
    pub dry_run: bool,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            moved: self.execution.moved,
            renamed: self.execution.renamed,
            deleted: self.execution.deleted,
            skipped: self.execution.skipped,
            directories_removed: self.pruned.removed.len(),
            duration_ms: self.execution.duration_ms,
        }
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory to organize in place
    pub root: PathBuf,
    /// Plan only; `apply` becomes a no-op
    pub dry_run: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            dry_run: false,
        }
    }
}

/// Builder for pipeline configuration
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the organize root
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
        }
    }
}

/// Scan, plan, apply, and clean up one root
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build a plan without progress reporting
    pub fn plan(&self) -> Result<Plan, OrganizeError> {
        self.plan_with_events(&null_sender())
    }

    /// Scan the root, read every media file once, and build the plan.
    ///
    /// Nothing on disk is changed.
    pub fn plan_with_events(&self, events: &EventSender) -> Result<Plan, OrganizeError> {
        let result = self.build_plan(events);
        if let Err(e) = &result {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    /// Apply a reviewed plan without progress reporting
    pub fn apply(&self, plan: &Plan, overrides: &Overrides) -> Result<RunReport, OrganizeError> {
        self.apply_with_events(plan, overrides, &null_sender())
    }

    /// Execute the plan, then remove directories the run left empty.
    ///
    /// Cleanup only runs when execution succeeded.
    pub fn apply_with_events(
        &self,
        plan: &Plan,
        overrides: &Overrides,
        events: &EventSender,
    ) -> Result<RunReport, OrganizeError> {
        if self.config.dry_run {
            info!(operations = plan.len(), "dry run, nothing applied");
            return Ok(RunReport {
                dry_run: true,
                ..Default::default()
            });
        }

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Executing,
        }));

        let execution = match Executor::execute(plan, overrides, events) {
            Ok(report) => report,
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Pruning,
        }));

        let mut candidates: BTreeSet<PathBuf> = execution.touched_dirs.clone();
        candidates.extend(plan.visited_dirs.iter().cloned());

        match DirScanner::new().scan(&plan.root) {
            Ok(rescan) => candidates.extend(rescan.visited_dirs),
            Err(e) => warn!(error = %e, "rescan before cleanup failed"),
        }

        let pruned =
            DirectoryPruner::new(&plan.root).prune_with_events(candidates, events);

        let report = RunReport {
            execution,
            pruned,
            dry_run: false,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: report.summary(),
        }));

        Ok(report)
    }

    fn build_plan(&self, events: &EventSender) -> Result<Plan, OrganizeError> {
        let start = Instant::now();
        let root = canonical_root(&self.config.root)?;

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));
        let scan = DirScanner::new().scan_with_events(&root, events)?;

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Planning,
        }));
        let records = collect_records(&scan.files, events)?;
        let plan = PlanBuilder::new(&root).build(&records, scan.visited_dirs)?;

        info!(
            root = %root.display(),
            operations = plan.len(),
            duplicates = plan.stats.duplicates_found,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "plan ready"
        );
        events.send(Event::Plan(PlanEvent::Completed {
            operations: plan.len(),
            duplicates: plan.stats.duplicates_found,
        }));

        Ok(plan)
    }
}

/// Absolute form of the root so every planned path shares one prefix
fn canonical_root(root: &Path) -> Result<PathBuf, ScanError> {
    let root = fs::canonicalize(root).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ScanError::RootNotFound {
            path: root.to_path_buf(),
        },
        io::ErrorKind::PermissionDenied => ScanError::PermissionDenied {
            path: root.to_path_buf(),
        },
        _ => ScanError::ReadDirectory {
            path: root.to_path_buf(),
            source,
        },
    })?;

    if !root.is_dir() {
        return Err(ScanError::NotADirectory { path: root });
    }
    Ok(root)
}
