//! # Media Sorter
//!
//! Organizes a folder of photos and videos into dated subfolders, in place.
//!
//! ## Core Philosophy
//! - **Plan before touching** - Nothing changes until the plan is accepted
//! - **Exact duplicates only** - Content must match byte for byte
//! - **Operator has the last word** - Any planned action can be overridden
//!
//! ## Architecture
//! - `core` - Scanning, planning, review, execution, and cleanup
//! - `events` - Progress reporting for whatever draws the UI
//! - `error` - Stage-scoped error types
//!
//! ## Example
//! ```rust,ignore
//! use media_sorter::core::pipeline::Pipeline;
//! use media_sorter::core::review::Overrides;
//!
//! let pipeline = Pipeline::builder().root("/Users/me/Pictures").build();
//! let plan = pipeline.plan()?;
//! let report = pipeline.apply(&plan, &Overrides::for_plan(&plan))?;
//! ```

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OrganizeError, Result};

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Meant for the application entry point. Fails if a global subscriber is
/// already set.
pub fn init_tracing() -> std::result::Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
