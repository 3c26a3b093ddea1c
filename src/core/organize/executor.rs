//! Executor for organization plans.

use super::types::*;
use crate::core::review::{Override, Overrides};
use crate::error::ExecuteError;
use crate::events::{AppliedAction, Event, EventSender, ExecuteEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// What will actually happen to one plan index once overrides are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveAction<'a> {
    Skip,
    Move { from: &'a Path, to: &'a Path, dir: &'a Path },
    Rename { from: &'a Path, to: &'a Path },
    Delete { path: &'a Path },
}

/// Overrides take precedence over the planned action
pub fn effective_action<'a>(
    op: &'a PlannedOperation,
    override_: Option<&'a Override>,
) -> EffectiveAction<'a> {
    match (override_, op) {
        (Some(Override::Ignore), _) => EffectiveAction::Skip,
        (Some(Override::Rename { new_path }), op) => EffectiveAction::Rename {
            from: op.source(),
            to: new_path,
        },
        (Some(Override::Delete), op) => EffectiveAction::Delete { path: op.source() },
        (None, PlannedOperation::Delete { source, .. }) => EffectiveAction::Delete { path: source },
        (
            None,
            PlannedOperation::Move {
                source,
                target,
                target_dir,
            },
        ) => EffectiveAction::Move {
            from: source,
            to: target,
            dir: target_dir,
        },
    }
}

/// Result of executing the plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub moved: usize,
    pub renamed: usize,
    pub deleted: usize,
    pub skipped: usize,
    /// Parent directories of every processed source
    pub touched_dirs: BTreeSet<PathBuf>,
    pub duration_ms: u64,
}

impl ExecutionReport {
    pub fn applied(&self) -> usize {
        self.moved + self.renamed + self.deleted
    }
}

/// Applies a plan to the filesystem
pub struct Executor;

impl Executor {
    /// Apply every operation in plan order.
    ///
    /// The first failure stops the run; operations already applied stay
    /// applied.
    pub fn execute(
        plan: &Plan,
        overrides: &Overrides,
        events: &EventSender,
    ) -> Result<ExecutionReport, ExecuteError> {
        if overrides.plan_id() != plan.id {
            return Err(ExecuteError::StaleOverrides {
                expected: plan.id,
                found: overrides.plan_id(),
            });
        }

        let start = Instant::now();
        let total = plan.len();
        let mut report = ExecutionReport::default();
        events.send(Event::Execute(ExecuteEvent::Started { total }));

        for (index, op) in plan.operations.iter().enumerate() {
            let applied = report.applied();
            let action = effective_action(op, overrides.get(index));

            let (done, path) = match action {
                EffectiveAction::Skip => {
                    report.skipped += 1;
                    (AppliedAction::Skipped, op.source().to_path_buf())
                }
                EffectiveAction::Move { from, to, dir } => {
                    ensure_vacant(from, to, applied)?;
                    create_dir(dir, applied)?;
                    move_file(from, to).map_err(|source| ExecuteError::Move {
                        from: from.to_path_buf(),
                        to: to.to_path_buf(),
                        applied,
                        source,
                    })?;
                    info!(from = %from.display(), to = %to.display(), "moved");
                    report.moved += 1;
                    (AppliedAction::Moved, to.to_path_buf())
                }
                EffectiveAction::Rename { from, to } => {
                    ensure_vacant(from, to, applied)?;
                    if let Some(parent) = to.parent() {
                        create_dir(parent, applied)?;
                    }
                    move_file(from, to).map_err(|source| ExecuteError::Move {
                        from: from.to_path_buf(),
                        to: to.to_path_buf(),
                        applied,
                        source,
                    })?;
                    info!(from = %from.display(), to = %to.display(), "renamed");
                    report.renamed += 1;
                    (AppliedAction::Renamed, to.to_path_buf())
                }
                EffectiveAction::Delete { path } => {
                    fs::remove_file(path).map_err(|source| ExecuteError::Delete {
                        path: path.to_path_buf(),
                        applied,
                        source,
                    })?;
                    info!(path = %path.display(), "deleted");
                    report.deleted += 1;
                    (AppliedAction::Deleted, path.to_path_buf())
                }
            };

            if done != AppliedAction::Skipped {
                if let Some(parent) = op.source().parent() {
                    report.touched_dirs.insert(parent.to_path_buf());
                }
            }

            events.send(Event::Execute(ExecuteEvent::Applied {
                index,
                total,
                action: done,
                path,
            }));
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        events.send(Event::Execute(ExecuteEvent::Completed {
            applied: report.applied(),
            skipped: report.skipped,
        }));

        Ok(report)
    }
}

fn create_dir(dir: &Path, applied: usize) -> Result<(), ExecuteError> {
    fs::create_dir_all(dir).map_err(|source| ExecuteError::CreateDir {
        path: dir.to_path_buf(),
        applied,
        source,
    })
}

/// `fs::rename` silently replaces an existing file, so refuse up front
fn ensure_vacant(from: &Path, to: &Path, applied: usize) -> Result<(), ExecuteError> {
    let occupied = to.try_exists().unwrap_or(true);
    if occupied {
        return Err(ExecuteError::Move {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            applied,
            source: io::Error::new(io::ErrorKind::AlreadyExists, "target already exists"),
        });
    }
    Ok(())
}

/// `rename` fails across filesystems, so fall back to copy + delete with a
/// size check before the source goes away.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to).or_else(|_| {
        let source_size = fs::metadata(from)?.len();
        fs::copy(from, to)?;

        let dest_size = fs::metadata(to)?.len();
        if dest_size != source_size {
            let _ = fs::remove_file(to);
            return Err(io::Error::other(format!(
                "copy verification failed: source {} bytes, dest {} bytes",
                source_size, dest_size
            )));
        }

        fs::remove_file(from)
    })
}
