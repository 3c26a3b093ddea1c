//! # CLI Module
//!
//! Command-line driver for the media organizer.
//!
//! ## Usage
//! ```bash
//! # Plan, review interactively, then apply
//! media-sort ~/Pictures/inbox
//!
//! # Show what would happen and exit
//! media-sort ~/Pictures/inbox --dry-run --verbose
//!
//! # Machine-readable plan
//! media-sort ~/Pictures/inbox --dry-run --json
//!
//! # Apply the plan as computed, no review
//! media-sort ~/Pictures/inbox --yes
//! ```

mod review;

use clap::Parser;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_sorter::core::organize::{Plan, PlannedOperation};
use media_sorter::core::pipeline::{Pipeline, RunReport};
use media_sorter::core::review::{Overrides, ReviewOutcome};
use media_sorter::error::{OrganizeError, ScanError};
use media_sorter::events::{
    Event, EventChannel, EventReceiver, EventSender, ExecuteEvent, PipelineEvent, PlanEvent,
    ScanEvent,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

/// Media Sorter - Date-bucket a photo folder, drop exact duplicates
#[derive(Parser, Debug)]
#[command(name = "media-sort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder to organize in place
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Print the plan and exit without changing anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Apply the plan without interactive review
    #[arg(short, long)]
    yes: bool,

    /// With --dry-run, print the plan as JSON
    #[arg(long)]
    json: bool,

    /// List every planned operation
    #[arg(short, long)]
    verbose: bool,
}

const EXIT_CANCELLED: u8 = 1;
const EXIT_STARTUP: u8 = 2;
const EXIT_RUN_ERROR: u8 = 3;

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    // A subscriber may already be installed by an embedding process
    let _ = media_sorter::init_tracing();

    let term = Term::stderr();
    match organize(&term, &cli) {
        Ok(code) => code,
        Err(e) => {
            term.write_line(&format!("{} {}", style("error:").red().bold(), e))
                .ok();
            if is_startup_error(&e) {
                ExitCode::from(EXIT_STARTUP)
            } else {
                ExitCode::from(EXIT_RUN_ERROR)
            }
        }
    }
}

fn organize(term: &Term, cli: &Cli) -> Result<ExitCode, OrganizeError> {
    let quiet = cli.json;
    if !quiet {
        term.write_line(&format!(
            "{} {}",
            style("Media Sorter").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let pipeline = Pipeline::builder()
        .root(&cli.path)
        .dry_run(cli.dry_run)
        .build();

    let (sender, receiver) = EventChannel::new();
    let show_progress = !quiet && term.is_term();
    let event_thread = thread::spawn(move || render_progress(receiver, show_progress));

    let outcome = plan_and_apply(term, cli, &pipeline, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    outcome
}

fn plan_and_apply(
    term: &Term,
    cli: &Cli,
    pipeline: &Pipeline,
    sender: &EventSender,
) -> Result<ExitCode, OrganizeError> {
    let plan = pipeline.plan_with_events(sender)?;

    if cli.dry_run {
        if cli.json {
            print_json_plan(&plan);
        } else {
            print_plan(term, &plan, cli.verbose);
            term.write_line(&format!(
                "{}",
                style("Dry run: no files were changed.").dim()
            ))
            .ok();
        }
        return Ok(ExitCode::SUCCESS);
    }

    print_plan(term, &plan, cli.verbose);
    if plan.is_empty() {
        term.write_line(&format!(
            "  {} Nothing to organize",
            style("✓").green().bold()
        ))
        .ok();
        return Ok(ExitCode::SUCCESS);
    }

    let (plan, overrides) = if cli.yes {
        let overrides = Overrides::for_plan(&plan);
        (plan, overrides)
    } else {
        let screen = Term::stdout();
        if !screen.is_term() {
            term.write_line(&format!(
                "{} interactive review needs a terminal; pass --yes to apply the plan as shown",
                style("error:").red().bold()
            ))
            .ok();
            return Ok(ExitCode::from(EXIT_STARTUP));
        }

        match review::run(&screen, plan) {
            Ok((ReviewOutcome::Execute, plan, overrides)) => (plan, overrides),
            Ok((ReviewOutcome::Cancelled, ..)) => {
                term.write_line(&format!(
                    "{}",
                    style("Cancelled. No files were changed.").yellow()
                ))
                .ok();
                return Ok(ExitCode::from(EXIT_CANCELLED));
            }
            Err(e) => {
                term.write_line(&format!(
                    "{} terminal input failed: {}",
                    style("error:").red().bold(),
                    e
                ))
                .ok();
                return Ok(ExitCode::from(EXIT_RUN_ERROR));
            }
        }
    };

    let report = pipeline.apply_with_events(&plan, &overrides, sender)?;
    print_report(term, &report);
    Ok(ExitCode::SUCCESS)
}

fn is_startup_error(error: &OrganizeError) -> bool {
    matches!(
        error,
        OrganizeError::Scan(
            ScanError::RootNotFound { .. }
                | ScanError::NotADirectory { .. }
                | ScanError::PermissionDenied { .. }
        )
    )
}

/// Drive progress bars from engine events until the channel closes
fn render_progress(receiver: EventReceiver, enabled: bool) {
    let mut bar: Option<ProgressBar> = None;

    for event in receiver.iter() {
        if !enabled {
            continue;
        }
        match event {
            Event::Scan(ScanEvent::Started { .. }) => {
                let pb = ProgressBar::new_spinner();
                pb.set_message("Scanning");
                bar = Some(pb);
            }
            Event::Scan(ScanEvent::FileFound { .. }) => {
                if let Some(ref pb) = bar {
                    pb.tick();
                }
            }
            Event::Scan(ScanEvent::Completed { total_files, .. }) => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
                bar = Some(counting_bar(total_files as u64, "Reading"));
            }
            Event::Plan(PlanEvent::Progress(p)) => {
                if let Some(ref pb) = bar {
                    pb.set_position(p.files_processed as u64);
                    pb.set_message(format!("{} duplicates", p.duplicates_found));
                }
            }
            Event::Execute(ExecuteEvent::Started { total }) => {
                bar = Some(counting_bar(total as u64, "Applying"));
            }
            Event::Execute(ExecuteEvent::Applied { index, .. }) => {
                if let Some(ref pb) = bar {
                    pb.set_position(index as u64 + 1);
                }
            }
            Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                if let Some(ref pb) = bar {
                    pb.set_message(format!("{}", phase));
                }
            }
            Event::Plan(PlanEvent::Completed { .. })
            | Event::Pipeline(PipelineEvent::Completed { .. })
            | Event::Pipeline(PipelineEvent::Error { .. }) => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
            }
            _ => {}
        }
    }

    if let Some(pb) = bar {
        pb.finish_and_clear();
    }
}

fn counting_bar(len: u64, message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");
    pb.set_style(style);
    pb.set_message(message);
    pb
}

fn print_plan(term: &Term, plan: &Plan, verbose: bool) {
    let stats = &plan.stats;
    term.write_line(&format!(
        "  {} media files in {}",
        style(stats.files_found).cyan(),
        plan.root.display()
    ))
    .ok();
    term.write_line(&format!(
        "  {} to move, {} duplicates to delete, {} already organized",
        style(stats.moves).cyan(),
        style(stats.deletes).yellow(),
        style(stats.already_organized).dim()
    ))
    .ok();
    term.write_line(&format!(
        "  {} images, {} raw, {} videos",
        style(stats.images).cyan(),
        style(stats.raw_images).cyan(),
        style(stats.videos).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} scanned",
        style(format_bytes(stats.total_size_bytes)).dim()
    ))
    .ok();
    term.write_line("").ok();

    if verbose {
        for (index, op) in plan.operations.iter().enumerate() {
            term.write_line(&format!(
                "  {:>4} {}",
                style(index + 1).dim(),
                describe_operation(&plan.root, op)
            ))
            .ok();
        }
        if !plan.is_empty() {
            term.write_line("").ok();
        }
    }
}

fn print_json_plan(plan: &Plan) {
    match serde_json::to_string_pretty(plan) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize plan: {}", e),
    }
}

fn print_report(term: &Term, report: &RunReport) {
    let summary = report.summary();
    term.write_line("").ok();
    term.write_line(&format!("{} Done", style("✓").green().bold()))
        .ok();
    term.write_line(&format!(
        "  {} moved, {} renamed, {} deleted, {} skipped",
        style(summary.moved).cyan(),
        style(summary.renamed).cyan(),
        style(summary.deleted).yellow(),
        style(summary.skipped).dim()
    ))
    .ok();
    term.write_line(&format!(
        "  {} empty folders removed in {:.1}s",
        style(summary.directories_removed).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
}

/// One-line description of a planned operation, paths relative to the root
pub(crate) fn describe_operation(root: &Path, op: &PlannedOperation) -> String {
    let relative = |p: &Path| p.strip_prefix(root).unwrap_or(p).display().to_string();
    match op {
        PlannedOperation::Move { source, target, .. } => format!(
            "{} {} -> {}",
            style("MOVE  ").cyan(),
            relative(source),
            relative(target)
        ),
        PlannedOperation::Delete { source, reason } => format!(
            "{} {} ({})",
            style("DELETE").red(),
            relative(source),
            style(reason).dim()
        ),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
