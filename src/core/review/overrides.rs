//! Operator overrides keyed by plan index.

use crate::core::organize::Plan;
use crate::error::ReviewError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// An operator decision replacing the planned action for one index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Override {
    /// Leave the file alone
    Ignore,
    /// Remove the source file
    Delete,
    /// Move the source to this absolute path instead
    Rename { new_path: PathBuf },
}

impl Override {
    /// Two overrides are the same kind regardless of rename target
    pub fn same_kind(&self, other: &Override) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Override::Ignore => "IGNORE",
            Override::Delete => "DELETE",
            Override::Rename { .. } => "RENAME",
        }
    }
}

/// Requesting the kind that is already set clears it; any other request
/// replaces what was there.
pub fn toggle(current: Option<&Override>, requested: Override) -> Option<Override> {
    match current {
        Some(existing) if existing.same_kind(&requested) => None,
        _ => Some(requested),
    }
}

/// Overrides for exactly one plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overrides {
    plan_id: Uuid,
    plan_len: usize,
    entries: BTreeMap<usize, Override>,
}

impl Overrides {
    /// Empty override set bound to `plan`
    pub fn for_plan(plan: &Plan) -> Self {
        Self {
            plan_id: plan.id,
            plan_len: plan.len(),
            entries: BTreeMap::new(),
        }
    }

    pub fn plan_id(&self) -> Uuid {
        self.plan_id
    }

    pub fn get(&self, index: usize) -> Option<&Override> {
        self.entries.get(&index)
    }

    /// Apply `requested` to `index` with toggle semantics
    pub fn toggle(&mut self, index: usize, requested: Override) -> Result<(), ReviewError> {
        self.check_index(index)?;
        match toggle(self.entries.get(&index), requested) {
            Some(next) => self.entries.insert(index, next),
            None => self.entries.remove(&index),
        };
        Ok(())
    }

    /// Set `index` unconditionally, replacing any existing override
    pub fn set(&mut self, index: usize, value: Override) -> Result<(), ReviewError> {
        self.check_index(index)?;
        self.entries.insert(index, value);
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> Option<Override> {
        self.entries.remove(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<(), ReviewError> {
        if index >= self.plan_len {
            return Err(ReviewError::IndexOutOfRange {
                index,
                len: self.plan_len,
            });
        }
        Ok(())
    }
}
