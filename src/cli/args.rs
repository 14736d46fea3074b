//! Defines the command-line arguments and subcommands for the harness CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "gauntlet",
    version,
    about = "A conformance test harness: discover, filter, and run parameterized spec tests."
)]
pub struct HarnessArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the cases a filter selects, without running any test body.
    List {
        /// Filter expression, e.g. 'suite:path,to,spec:test:{"param":1}'.
        #[arg(required = true)]
        filter: String,
    },
    /// Run the cases a filter selects and print a report.
    Run {
        /// Filter expression, e.g. 'suite:path,to,spec:test:{"param":1}'.
        #[arg(required = true)]
        filter: String,
        /// Per-case deadline in milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Print the versioned JSON report document instead of the human
        /// summary.
        #[arg(long)]
        json: bool,
        /// Exit 0 even when the filter selects no cases.
        #[arg(long)]
        allow_empty: bool,
    },
}
