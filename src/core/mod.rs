//! # Core Module
//!
//! The UI-agnostic organize engine.
//!
//! ## Modules
//! - `scanner` - Finds media files and skips organized subtrees
//! - `metadata` - Resolves capture dates from EXIF or file timestamps
//! - `fingerprint` - Content identity via SHA-256
//! - `organize` - Builds and executes the plan
//! - `review` - Operator overrides and the review state machine
//! - `prune` - Removes directories left empty
//! - `pipeline` - Orchestrates the full workflow

pub mod fingerprint;
pub mod metadata;
pub mod organize;
pub mod pipeline;
pub mod prune;
pub mod review;
pub mod scanner;

pub use fingerprint::Fingerprint;
pub use metadata::{CaptureDate, DateSource};
pub use organize::{Plan, PlannedOperation};
pub use review::{Override, Overrides};
pub use scanner::MediaKind;
