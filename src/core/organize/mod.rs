//! Photo organization module.
//!
//! Buckets media into `<root>/YYYY/YYYY-MM-DD` folders, turning exact
//! duplicates into deletions.

mod executor;
mod planner;
mod records;
mod types;

pub use executor::{effective_action, EffectiveAction, ExecutionReport, Executor};
pub use planner::{target_dir, PlanBuilder};
pub use records::collect_records;
pub use types::*;
