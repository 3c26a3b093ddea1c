//! # Review Module
//!
//! Lets an operator adjust the plan before anything touches the disk.
//!
//! Overrides are stored per plan index and are only valid for the plan they
//! were made against. The session is a small state machine:
//!
//! ```text
//! Reviewing ──ToggleRename──▶ RenameInput ──Commit/Cancel──▶ Reviewing
//!     │
//!     ├─Confirm──▶ Reviewing{confirming} ──Confirm──▶ Terminal(Execute)
//!     └─Cancel───────────────────────────────────────▶ Terminal(Cancelled)
//! ```

mod overrides;
mod session;

pub use overrides::{toggle, Override, Overrides};
pub use session::{ReviewEvent, ReviewMode, ReviewOutcome, ReviewSession};
