//! Handles all user-facing output for the CLI.
//!
//! Centralizes status lines, the summary, and the failed-case recap so every
//! command renders results the same way. Colors follow the terminal: auto
//! when stdout is a tty, off otherwise.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::recorder::{Status, TestCaseResult};
use crate::runner::RunSummary;

/// Color choice for stdout, honoring tty detection.
pub fn stdout_color_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn status_color(status: Status) -> Option<Color> {
    match status {
        Status::Pass => Some(Color::Green),
        Status::Warn | Status::Skip => Some(Color::Yellow),
        Status::Fail => Some(Color::Red),
        Status::Running => None,
    }
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Pass => "PASS",
        Status::Warn => "WARN",
        Status::Skip => "SKIP",
        Status::Fail => "FAIL",
        Status::Running => "RUNNING",
    }
}

/// Prints one `STATUS: case-name (time)` line.
pub fn print_case(
    out: &mut StandardStream,
    name: &str,
    result: &TestCaseResult,
) -> io::Result<()> {
    let mut spec = ColorSpec::new();
    spec.set_fg(status_color(result.status));
    out.set_color(&spec)?;
    write!(out, "{}", status_label(result.status))?;
    out.reset()?;
    writeln!(out, ": {} ({:.1}ms)", name, result.timems)?;

    if result.status == Status::Fail {
        for entry in &result.logs {
            writeln!(out, "    {}", entry.message)?;
        }
    }
    Ok(())
}

/// Prints the aggregate summary line.
pub fn print_summary(out: &mut StandardStream, summary: &RunSummary) -> io::Result<()> {
    writeln!(
        out,
        "\nTest summary: total {}, passed {}, warned {}, skipped {}, failed {}",
        summary.total, summary.pass, summary.warn, summary.skip, summary.fail
    )
}

/// Prints the recap of failed case names, if any failed.
pub fn print_failed_recap(
    out: &mut StandardStream,
    results: &[(String, TestCaseResult)],
) -> io::Result<()> {
    let failed: Vec<&str> = results
        .iter()
        .filter(|(_, r)| r.status == Status::Fail)
        .map(|(name, _)| name.as_str())
        .collect();
    if failed.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nFailed cases:")?;
    for name in failed {
        writeln!(out, "  - {}", name)?;
    }
    Ok(())
}
