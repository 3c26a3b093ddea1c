//! Terminal front end for the review session.
//!
//! Draws the plan with `console`, reads keys, and feeds decoded events to
//! the engine's `ReviewSession`. No planning decisions are made here.

use super::describe_operation;
use console::{style, Key, Term};
use media_sorter::core::organize::Plan;
use media_sorter::core::review::{
    Override, Overrides, ReviewEvent, ReviewMode, ReviewOutcome, ReviewSession,
};
use std::io;

const HELP: &str = "↑/↓ move  i ignore  d delete  r rename  enter execute  q quit";

/// Run the review loop until the operator executes or cancels
pub fn run(term: &Term, plan: Plan) -> io::Result<(ReviewOutcome, Plan, Overrides)> {
    let mut session = ReviewSession::new(plan);
    let mut notice: Option<String> = None;

    term.hide_cursor()?;
    let outcome = loop {
        draw(term, &session, notice.as_deref())?;
        if let Some(outcome) = session.outcome() {
            break outcome;
        }

        let key = term.read_key()?;
        let Some(event) = map_key(session.mode(), key) else {
            continue;
        };
        notice = session.handle(event).err().map(|e| e.to_string());
    };
    term.show_cursor()?;
    term.clear_screen()?;

    let (plan, overrides) = session.into_parts();
    Ok((outcome, plan, overrides))
}

/// Translate a key press for the current mode
pub fn map_key(mode: &ReviewMode, key: Key) -> Option<ReviewEvent> {
    match mode {
        ReviewMode::Terminal(_) => None,
        ReviewMode::RenameInput { .. } => match key {
            Key::Enter => Some(ReviewEvent::CommitRename),
            Key::Escape => Some(ReviewEvent::CancelRename),
            Key::Backspace => Some(ReviewEvent::Backspace),
            Key::Char(c) if !c.is_control() => Some(ReviewEvent::Input(c)),
            _ => None,
        },
        ReviewMode::Reviewing { confirming: true } => match key {
            Key::Char('y') | Key::Char('Y') => Some(ReviewEvent::Confirm),
            Key::Char('n') | Key::Char('N') | Key::Escape => Some(ReviewEvent::Cancel),
            _ => None,
        },
        ReviewMode::Reviewing { confirming: false } => match key {
            Key::ArrowUp | Key::Char('k') => Some(ReviewEvent::Up),
            Key::ArrowDown | Key::Char('j') => Some(ReviewEvent::Down),
            Key::Char('i') => Some(ReviewEvent::ToggleIgnore),
            Key::Char('d') => Some(ReviewEvent::ToggleDelete),
            Key::Char('r') => Some(ReviewEvent::ToggleRename),
            Key::Enter => Some(ReviewEvent::Confirm),
            Key::Escape | Key::Char('q') => Some(ReviewEvent::Cancel),
            _ => None,
        },
    }
}

fn draw(term: &Term, session: &ReviewSession, notice: Option<&str>) -> io::Result<()> {
    let plan = session.plan();
    let (rows, _) = term.size();
    let visible = (rows as usize).saturating_sub(7).max(3);
    let selected = session.selected();
    let first = window_start(selected, plan.len(), visible);

    term.clear_screen()?;
    term.write_line(&format!(
        "{}  {} files, {} duplicates, {} operations, {} overridden",
        style("Review plan").bold().cyan(),
        plan.stats.files_found,
        plan.stats.duplicates_found,
        plan.len(),
        session.overrides().len()
    ))?;
    term.write_line("")?;

    for (index, op) in plan.operations.iter().enumerate().skip(first).take(visible) {
        let cursor = if index == selected {
            style(">").green().bold().to_string()
        } else {
            " ".to_string()
        };
        let line = describe_operation(&plan.root, op);
        let line = match session.overrides().get(index) {
            Some(Override::Rename { new_path }) => format!(
                "{} {} {}",
                style("[RENAME]").yellow().bold(),
                style(line).dim(),
                new_path
                    .strip_prefix(&plan.root)
                    .unwrap_or(new_path)
                    .display()
            ),
            Some(o) => format!(
                "{} {}",
                style(format!("[{}]", o.label())).yellow().bold(),
                style(line).dim()
            ),
            None => line,
        };
        term.write_line(&format!("{} {}", cursor, line))?;
    }

    term.write_line("")?;
    match session.mode() {
        ReviewMode::RenameInput { text } => term.write_line(&format!(
            "{} {}_  {}",
            style("New name:").bold(),
            text,
            style("(enter to save, esc to discard)").dim()
        ))?,
        ReviewMode::Reviewing { confirming: true } => term.write_line(&format!(
            "{} [y/n]",
            style(format!("Apply {} operations?", plan.len())).bold().yellow()
        ))?,
        _ => term.write_line(&format!("{}", style(HELP).dim()))?,
    }
    if let Some(notice) = notice {
        term.write_line(&format!("{}", style(notice).red()))?;
    }
    Ok(())
}

/// First row to draw so the selection stays on screen
fn window_start(selected: usize, len: usize, visible: usize) -> usize {
    if len <= visible {
        return 0;
    }
    let half = visible / 2;
    selected.saturating_sub(half).min(len - visible)
}
