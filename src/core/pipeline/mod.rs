//! # Pipeline Module
//!
//! Orchestrates a full run over one root.
//!
//! ## Stages
//! 1. **Scan** - Walk the root, skipping organized subtrees
//! 2. **Plan** - Date and fingerprint every file, then build the plan
//! 3. **Execute** - Apply the plan with the operator's overrides
//! 4. **Prune** - Remove directories the run left empty
//!
//! Planning and applying are separate calls so a review step can sit in
//! between. Everything runs sequentially on the calling thread.

mod runner;

pub use runner::{Pipeline, PipelineBuilder, PipelineConfig, RunReport};
