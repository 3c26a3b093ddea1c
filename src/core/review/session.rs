//! Interactive review state machine.

use super::overrides::{Override, Overrides};
use crate::core::organize::{effective_action, EffectiveAction, Plan, PlannedOperation};
use crate::error::ReviewError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// How a review ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewOutcome {
    Execute,
    Cancelled,
}

/// Where the session currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewMode {
    /// Navigating the plan. `confirming` is set while the operator is asked
    /// whether to execute.
    Reviewing { confirming: bool },
    /// Editing the file name for a rename of the selected index
    RenameInput { text: String },
    Terminal(ReviewOutcome),
}

/// Decoded input delivered by the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewEvent {
    Up,
    Down,
    ToggleIgnore,
    ToggleDelete,
    ToggleRename,
    /// Append a character to the rename text
    Input(char),
    /// Drop the last character of the rename text
    Backspace,
    CommitRename,
    CancelRename,
    /// First press asks for confirmation, second press executes
    Confirm,
    Cancel,
}

/// One review pass over an immutable plan
#[derive(Debug)]
pub struct ReviewSession {
    plan: Plan,
    overrides: Overrides,
    selected: usize,
    mode: ReviewMode,
}

impl ReviewSession {
    pub fn new(plan: Plan) -> Self {
        let overrides = Overrides::for_plan(&plan);
        Self {
            plan,
            overrides,
            selected: 0,
            mode: ReviewMode::Reviewing { confirming: false },
        }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn mode(&self) -> &ReviewMode {
        &self.mode
    }

    /// Outcome once the session is terminal
    pub fn outcome(&self) -> Option<ReviewOutcome> {
        match self.mode {
            ReviewMode::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Hand back the plan and overrides for execution
    pub fn into_parts(self) -> (Plan, Overrides) {
        (self.plan, self.overrides)
    }

    /// Process one input event.
    ///
    /// Errors leave the session in the state it was in before the event.
    pub fn handle(&mut self, event: ReviewEvent) -> Result<(), ReviewError> {
        match self.mode {
            ReviewMode::Terminal(_) => Err(ReviewError::NotReviewing),
            ReviewMode::Reviewing { confirming: true } => {
                match event {
                    ReviewEvent::Confirm => self.finish(ReviewOutcome::Execute),
                    ReviewEvent::Cancel => self.finish(ReviewOutcome::Cancelled),
                    _ => {}
                }
                Ok(())
            }
            ReviewMode::Reviewing { confirming: false } => self.handle_reviewing(event),
            ReviewMode::RenameInput { .. } => self.handle_rename_input(event),
        }
    }

    fn handle_reviewing(&mut self, event: ReviewEvent) -> Result<(), ReviewError> {
        match event {
            ReviewEvent::Up => self.selected = self.selected.saturating_sub(1),
            ReviewEvent::Down => {
                if self.selected + 1 < self.plan.len() {
                    self.selected += 1;
                }
            }
            ReviewEvent::ToggleIgnore => self.overrides.toggle(self.selected, Override::Ignore)?,
            ReviewEvent::ToggleDelete => self.overrides.toggle(self.selected, Override::Delete)?,
            ReviewEvent::ToggleRename => {
                let seed = self.selected_op()?.display_name();
                if matches!(self.overrides.get(self.selected), Some(Override::Rename { .. })) {
                    self.overrides.clear(self.selected);
                } else {
                    self.mode = ReviewMode::RenameInput { text: seed };
                }
            }
            ReviewEvent::Confirm => self.mode = ReviewMode::Reviewing { confirming: true },
            ReviewEvent::Cancel => self.finish(ReviewOutcome::Cancelled),
            ReviewEvent::Input(_)
            | ReviewEvent::Backspace
            | ReviewEvent::CommitRename
            | ReviewEvent::CancelRename => {}
        }
        Ok(())
    }

    fn handle_rename_input(&mut self, event: ReviewEvent) -> Result<(), ReviewError> {
        let ReviewMode::RenameInput { text } = &mut self.mode else {
            return Ok(());
        };

        match event {
            ReviewEvent::Input(c) => text.push(c),
            ReviewEvent::Backspace => {
                text.pop();
            }
            ReviewEvent::CancelRename | ReviewEvent::Cancel => {
                self.mode = ReviewMode::Reviewing { confirming: false };
            }
            ReviewEvent::CommitRename => {
                let name = text.trim().to_string();
                let op = self.selected_op()?;
                let new_path = rename_target(op, &name)?;
                if self.is_claimed_elsewhere(&new_path) {
                    return Err(ReviewError::TargetTaken { path: new_path });
                }
                debug!(index = self.selected, new_path = %new_path.display(), "rename override");
                self.overrides
                    .set(self.selected, Override::Rename { new_path })?;
                self.mode = ReviewMode::Reviewing { confirming: false };
            }
            _ => {}
        }
        Ok(())
    }

    fn selected_op(&self) -> Result<&PlannedOperation, ReviewError> {
        self.plan
            .get(self.selected)
            .ok_or(ReviewError::IndexOutOfRange {
                index: self.selected,
                len: self.plan.len(),
            })
    }

    /// Whether any other index currently ends at `path`
    fn is_claimed_elsewhere(&self, path: &Path) -> bool {
        self.plan
            .operations
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != self.selected)
            .any(|(index, op)| match effective_action(op, self.overrides.get(index)) {
                EffectiveAction::Move { to, .. } | EffectiveAction::Rename { to, .. } => to == path,
                EffectiveAction::Skip | EffectiveAction::Delete { .. } => false,
            })
    }

    fn finish(&mut self, outcome: ReviewOutcome) {
        debug!(?outcome, overrides = self.overrides.len(), "review finished");
        self.mode = ReviewMode::Terminal(outcome);
    }
}

/// Resolve a typed file name: next to the planned destination for a move,
/// next to the original file for a delete.
fn rename_target(op: &PlannedOperation, name: &str) -> Result<PathBuf, ReviewError> {
    if name.is_empty() {
        return Err(ReviewError::EmptyName);
    }
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal {
        return Err(ReviewError::InvalidName {
            name: name.to_string(),
        });
    }

    let base = op.rename_base_dir().unwrap_or_else(|| Path::new(""));
    Ok(base.join(name))
}
