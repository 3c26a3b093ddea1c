//! # Error Module
//!
//! Error types for the media organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Stage-scoped** - each stage of the run has its own error enum
//! - **No rollback** - execution errors report how far the run got

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    #[error("Execution error: {0}")]
    Execute(#[from] ExecuteError),
}

/// Errors that occur while walking the root directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Root directory not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while hashing file content
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while building the plan
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Failed to read timestamps of {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the review session
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Plan index {index} is out of range (plan has {len} operations)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Rename target cannot be empty")]
    EmptyName,

    #[error("Rename target must be a plain file name: {name}")]
    InvalidName { name: String },

    #[error("Another operation already writes to {path}")]
    TargetTaken { path: PathBuf },

    #[error("Review session has already finished")]
    NotReviewing,
}

/// Errors that abort plan execution.
///
/// `applied` is the number of operations that were already carried out
/// before the failure. They are not undone.
#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("Overrides were made for plan {found}, not for plan {expected}")]
    StaleOverrides { expected: Uuid, found: Uuid },

    #[error("Failed to create directory {path} after {applied} operations: {source}")]
    CreateDir {
        path: PathBuf,
        applied: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to} after {applied} operations: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        applied: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete {path} after {applied} operations: {source}")]
    Delete {
        path: PathBuf,
        applied: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizeError>;
