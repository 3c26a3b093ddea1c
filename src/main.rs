//! # media-sort CLI
//!
//! Command-line driver for the media organizer.
//!
//! ## Usage
//! ```bash
//! media-sort ~/Pictures/inbox
//! media-sort ~/Pictures/inbox --dry-run --verbose
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
